//! View naming and signatures

use crate::view::View;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const MAX_NAME_LEN: usize = 100;

static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

/// View name qualified by `namespace`
pub fn view_name(namespace: &str, view: &View) -> String {
    if namespace.is_empty() {
        view.name.clone()
    } else {
        format!("{}.{}", namespace, view.name)
    }
}

/// Identity of a view: its qualified name followed by `_<key>` for each
/// tag key in declaration order. Descriptions do not participate.
pub fn view_signature(namespace: &str, view: &View) -> String {
    let mut sig = view_name(namespace, view);
    for key in &view.tag_keys {
        sig.push('_');
        sig.push_str(key);
    }
    sig
}

/// Make a metric name safe for the wire.
///
/// Characters outside `[A-Za-z0-9_.]` become `_`, a leading digit gets a
/// `key_` prefix, and the result is capped at 100 characters.
pub fn sanitize_name(name: &str) -> Cow<'_, str> {
    let re = INVALID_CHARS
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_.]").expect("Failed to compile sanitize pattern"));

    let needs_prefix = name.starts_with(|c: char| c.is_ascii_digit());
    let replaced = re.replace_all(name, "_");

    if !needs_prefix && replaced.chars().count() <= MAX_NAME_LEN {
        return replaced;
    }

    let mut out = String::with_capacity(MAX_NAME_LEN);
    if needs_prefix {
        out.push_str("key_");
    }
    out.extend(replaced.chars());
    if out.chars().count() > MAX_NAME_LEN {
        out = out.chars().take(MAX_NAME_LEN).collect();
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Aggregation;

    fn view(name: &str, keys: &[&str], description: &str) -> View {
        View::new(name, Aggregation::Count)
            .with_tag_keys(keys.iter().copied())
            .with_description(description)
    }

    #[test]
    fn test_view_name() {
        let v = view("requests", &[], "");
        assert_eq!(view_name("", &v), "requests");
        assert_eq!(view_name("app", &v), "app.requests");
    }

    #[test]
    fn test_signature_includes_ordered_keys() {
        let v = view("requests", &["method", "status"], "");
        assert_eq!(view_signature("app", &v), "app.requests_method_status");

        let reordered = view("requests", &["status", "method"], "");
        assert_ne!(view_signature("app", &v), view_signature("app", &reordered));
    }

    #[test]
    fn test_signature_ignores_description() {
        let a = view("requests", &["method"], "first");
        let b = view("requests", &["method"], "second");
        assert_eq!(view_signature("app", &a), view_signature("app", &b));
    }

    #[test]
    fn test_signature_depends_on_namespace() {
        let v = view("requests", &["method"], "");
        assert_ne!(view_signature("a", &v), view_signature("b", &v));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_name("grpc.io/client/latency"), "grpc.io_client_latency");
        assert_eq!(sanitize_name("already_fine.name"), "already_fine.name");
        assert_eq!(sanitize_name("9lives"), "key_9lives");
        assert_eq!(sanitize_name(&"x".repeat(150)).len(), 100);
    }
}
