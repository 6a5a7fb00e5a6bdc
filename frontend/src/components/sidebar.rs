use super::super::{Dashboard, Msg};
use shared::Page;
use std::str::FromStr;
use strum::IntoEnumIterator;
use web_sys::HtmlSelectElement;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_sidebar(current: Page, link: &Scope<Dashboard>) -> Html {
    let onchange = link.batch_callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Page::from_str(&select.value()).ok().map(Msg::SelectPage)
    });

    html! {
        <aside class="sidebar">
            <h2>{"Dashboard"}</h2>
            <label for="page-select">{"Select Page"}</label>
            <select id="page-select" {onchange}>
                { for Page::iter().map(|page| html! {
                    <option value={page.to_string()} selected={page == current}>
                        { page.to_string() }
                    </option>
                }) }
            </select>
        </aside>
    }
}
