pub struct LoginArgs {
    pub token: String,
}

pub struct DashboardArgs {
    /// Poll a single time and exit
    pub once: bool,
    pub base_url: Option<String>,
}
