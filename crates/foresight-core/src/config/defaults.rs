pub(super) fn default_name() -> String {
    "Foresight".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.foresight".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_pool_path() -> String {
    "foresights".to_string()
}
pub(super) fn default_state_path() -> String {
    "~/.foresight/user-foresights.json".to_string()
}
pub(super) fn default_intro() -> String {
    "Ваше передбачення на сьогодні:".to_string()
}
pub(super) fn default_poll_interval_ms() -> u64 {
    250
}
pub(super) fn default_poll_timeout_secs() -> u64 {
    30
}
