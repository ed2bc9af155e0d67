use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use syncgate_kernel::SyncPolicy;
use tracing::debug;

pub fn load_policy_or_exit(path: &str) -> SyncPolicy {
    let policy = SyncPolicy::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });
    debug!(
        path,
        types = policy.registry().document_types().len(),
        "loaded policy"
    );
    policy
}

pub fn read_json_file_or_exit<T>(path: &str, label: &str) -> T
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {label} at {path}: {e}");
        std::process::exit(2);
    });
    serde_json::from_slice::<T>(&bytes).unwrap_or_else(|e| {
        eprintln!("error: failed to parse {label} JSON at {path}: {e}");
        std::process::exit(2);
    })
}

pub fn render_json_or_exit<T>(payload: &T, label: &str) -> String
where
    T: Serialize + ?Sized,
{
    serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render {label} json: {e}");
        std::process::exit(2);
    })
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

pub fn comma_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}
