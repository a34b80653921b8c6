/// Capabilities reserved for platform administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Create errands on behalf of offline senders and assign offline runners
    ManageErrands,

    /// List every errand regardless of participant
    ViewAllErrands,
}

impl AdminCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCapability::ManageErrands => "manage_errands",
            AdminCapability::ViewAllErrands => "view_all_errands",
        }
    }
}
