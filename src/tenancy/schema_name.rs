use sha2::{Digest, Sha256};

use super::error::TenantError;

/// Postgres caps identifiers at 63 bytes; longer names are silently
/// truncated by the server, so reject them up front instead.
pub const MAX_SCHEMA_NAME_LEN: usize = 63;

/// Namespaces that must never be handed out to a tenant, even though some
/// of them satisfy the grammar.
const RESERVED_NAMES: &[&str] = &[
    "public",
    "shared",
    "postgres",
    "pg_catalog",
    "pg_toast",
    "pg_temp",
    "information_schema",
];

/// Validate a candidate schema name for safe interpolation as a SQL
/// identifier. Schema names cannot be bound as statement parameters, so
/// this allow-list is the single injection choke point: every call site
/// that embeds a schema name into SQL text must go through it, including
/// names read back from the registry.
///
/// Accepts `[a-z][a-z0-9_]*` up to 63 characters, minus reserved system
/// namespaces. Returns the input unchanged, so validating twice is a no-op.
pub fn assert_valid_schema_name(candidate: &str) -> Result<&str, TenantError> {
    let mut chars = candidate.chars();
    let valid_start = matches!(chars.next(), Some('a'..='z'));
    let valid_rest = chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'));

    if !valid_start || !valid_rest || candidate.len() > MAX_SCHEMA_NAME_LEN {
        return Err(TenantError::InvalidSchemaName(candidate.to_string()));
    }

    if RESERVED_NAMES.contains(&candidate) {
        return Err(TenantError::InvalidSchemaName(candidate.to_string()));
    }

    Ok(candidate)
}

/// Derive a schema name from a tenant display name: lowercase, squash
/// anything outside the identifier grammar into single underscores, and
/// prefix names that would start with a digit. `taken` reports whether a
/// candidate already exists in the registry; on collision a short
/// sha-256 suffix of the display name disambiguates.
pub fn derive_schema_name(
    display_name: &str,
    taken: impl Fn(&str) -> bool,
) -> Result<String, TenantError> {
    let mut slug = String::new();
    for c in display_name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            _ => {
                if !slug.ends_with('_') {
                    slug.push('_');
                }
            }
        }
    }
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        return Err(TenantError::InvalidSchemaName(display_name.to_string()));
    }

    let mut base = if slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("t_{}", slug)
    } else {
        slug.to_string()
    };
    // Leave room for a collision suffix
    base.truncate(MAX_SCHEMA_NAME_LEN - 10);
    let base = base.trim_end_matches('_').to_string();

    let candidate = assert_valid_schema_name(&base)?.to_string();
    if !taken(&candidate) {
        return Ok(candidate);
    }

    let suffixed = format!("{}_{}", candidate, short_hash(display_name));
    let suffixed = assert_valid_schema_name(&suffixed)?.to_string();
    if taken(&suffixed) {
        // Same display name hashing to a taken suffix means the tenant
        // is effectively a duplicate
        return Err(TenantError::Duplicate(suffixed));
    }
    Ok(suffixed)
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    hash[..8].to_string()
}

/// Quote an already-validated identifier for embedding in DDL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        for name in ["acme", "acme_school", "a", "north_campus_2024"] {
            assert_eq!(assert_valid_schema_name(name).unwrap(), name);
        }
    }

    #[test]
    fn rejects_bad_grammar() {
        for name in [
            "",
            "Acme",
            "1school",
            "_school",
            "acme-school",
            "acme school",
            "acme;drop",
            "t\"quoted",
        ] {
            assert!(
                assert_valid_schema_name(name).is_err(),
                "expected rejection: {:?}",
                name
            );
        }
    }

    #[test]
    fn rejects_reserved_namespaces() {
        for name in ["public", "shared", "pg_catalog", "information_schema", "postgres"] {
            assert!(assert_valid_schema_name(name).is_err(), "reserved: {}", name);
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(MAX_SCHEMA_NAME_LEN + 1);
        assert!(assert_valid_schema_name(&long).is_err());
        let max = "a".repeat(MAX_SCHEMA_NAME_LEN);
        assert!(assert_valid_schema_name(&max).is_ok());
    }

    #[test]
    fn validation_is_idempotent() {
        let once = assert_valid_schema_name("acme_school").unwrap();
        let twice = assert_valid_schema_name(once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn derives_slug_from_display_name() {
        let name = derive_schema_name("Acme School", |_| false).unwrap();
        assert_eq!(name, "acme_school");

        let name = derive_schema_name("École — Saint-Denis!", |_| false).unwrap();
        assert_eq!(name, "cole_saint_denis");

        let name = derive_schema_name("42nd Street Academy", |_| false).unwrap();
        assert!(name.starts_with("t_42nd"));
    }

    #[test]
    fn derivation_appends_suffix_on_collision() {
        let name = derive_schema_name("Acme School", |c| c == "acme_school").unwrap();
        assert!(name.starts_with("acme_school_"));
        assert_eq!(name.len(), "acme_school_".len() + 8);
        assert_valid_schema_name(&name).unwrap();
    }

    #[test]
    fn derivation_rejects_unusable_names() {
        assert!(derive_schema_name("!!!", |_| false).is_err());
        assert!(derive_schema_name("", |_| false).is_err());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("acme"), "\"acme\"");
    }
}
