use jsonld::VisibilityGate;

use crate::store::IndividualRef;

/// Which individuals may be disclosed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivacyPolicy {
    ShowAll,
    /// Hide records marked `RESN confidential` or `RESN privacy`.
    #[default]
    RespectRestrictions,
    /// As [`PrivacyPolicy::RespectRestrictions`], and also hide everyone
    /// who is not known to have died.
    HideLiving,
}

impl VisibilityGate<IndividualRef> for PrivacyPolicy {
    fn can_show(&self, record: &IndividualRef) -> bool {
        let data = record.data();
        match self {
            PrivacyPolicy::ShowAll => true,
            PrivacyPolicy::RespectRestrictions => !data.restricted,
            PrivacyPolicy::HideLiving => !data.restricted && data.deceased,
        }
    }
}
