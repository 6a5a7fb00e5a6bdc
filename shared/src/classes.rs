use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount, EnumIter};

/// The four retinal conditions the classifier distinguishes, in the order of
/// the network's output vector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumCount,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiseaseClass {
    Cnv,
    Dme,
    Drusen,
    Normal,
}

/// One-line description shown above the recommendation text. The emphasized
/// part is rendered in italics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caption {
    pub lead: &'static str,
    pub emphasis: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub overview: &'static str,
    pub findings: &'static [&'static str],
    pub next_steps: &'static [&'static str],
}

const CNV: Recommendation = Recommendation {
    overview: "Choroidal neovascularization is the growth of abnormal blood vessels from the \
               choroid through Bruch's membrane. Leakage from these vessels causes fluid and \
               blood to collect beneath the retina, and it is the hallmark of neovascular \
               (wet) age-related macular degeneration.",
    findings: &[
        "Subretinal or sub-RPE fluid",
        "Neovascular membrane with RPE elevation",
        "Possible intraretinal cysts and subretinal hyperreflective material",
    ],
    next_steps: &[
        "Refer promptly to a retinal specialist; vision loss can progress within weeks.",
        "Confirmation usually involves OCT angiography or fluorescein angiography.",
        "Anti-VEGF injection therapy is the standard first-line treatment.",
    ],
};

const DME: Recommendation = Recommendation {
    overview: "Diabetic macular edema is swelling of the central retina caused by fluid \
               leaking from damaged capillaries in people with diabetic retinopathy. It is the \
               most common cause of vision loss in diabetes.",
    findings: &[
        "Increased central retinal thickness",
        "Intraretinal fluid and cystoid spaces",
        "Hyperreflective foci and hard exudates",
    ],
    next_steps: &[
        "Arrange review with an ophthalmologist for treatment planning.",
        "Tight control of blood glucose, blood pressure and lipids slows progression.",
        "Treatment options include anti-VEGF injections, steroids and focal laser.",
    ],
};

const DRUSEN: Recommendation = Recommendation {
    overview: "Drusen are yellow deposits of lipid and protein that build up between the \
               retinal pigment epithelium and Bruch's membrane. Larger or numerous drusen are \
               a sign of early age-related macular degeneration.",
    findings: &[
        "Dome-shaped elevations of the RPE",
        "Preserved retinal layers without fluid",
    ],
    next_steps: &[
        "Schedule regular monitoring to detect progression to advanced AMD.",
        "Home monitoring with an Amsler grid helps catch new distortion early.",
        "AREDS2 supplements and not smoking lower the risk of progression.",
    ],
};

const NORMAL: Recommendation = Recommendation {
    overview: "The scan shows a healthy retinal profile with the layers intact and no signs \
               of fluid, neovascularization or deposits.",
    findings: &[
        "Preserved foveal contour",
        "No intraretinal or subretinal fluid",
        "Continuous retinal layers",
    ],
    next_steps: &[
        "Continue routine eye examinations at the usual interval.",
        "Seek care if new symptoms such as blurring or distortion appear.",
    ],
};

impl DiseaseClass {
    pub const ALL: [DiseaseClass; 4] = [
        DiseaseClass::Cnv,
        DiseaseClass::Dme,
        DiseaseClass::Drusen,
        DiseaseClass::Normal,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Label shown in the prediction banner.
    pub fn label(self) -> &'static str {
        match self {
            DiseaseClass::Cnv => "CNV",
            DiseaseClass::Dme => "DME",
            DiseaseClass::Drusen => "DRUSEN",
            DiseaseClass::Normal => "NORMAL",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            DiseaseClass::Cnv => "Choroidal Neovascularization",
            DiseaseClass::Dme => "Diabetic Macular Edema",
            DiseaseClass::Drusen => "Drusen (Early AMD)",
            DiseaseClass::Normal => "Normal Retina",
        }
    }

    pub fn caption(self) -> Caption {
        let emphasis = match self {
            DiseaseClass::Cnv => "CNV with subretinal fluid.",
            DiseaseClass::Dme => "DME with retinal thickening and intraretinal fluid.",
            DiseaseClass::Drusen => "Drusen deposits in early AMD.",
            DiseaseClass::Normal => "normal retina with preserved foveal contour.",
        };
        let lead = match self {
            DiseaseClass::Normal => "OCT scan showing a",
            _ => "OCT scan showing",
        };
        Caption { lead, emphasis }
    }

    pub fn recommendation(self) -> &'static Recommendation {
        match self {
            DiseaseClass::Cnv => &CNV,
            DiseaseClass::Dme => &DME,
            DiseaseClass::Drusen => &DRUSEN,
            DiseaseClass::Normal => &NORMAL,
        }
    }
}

impl std::fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
