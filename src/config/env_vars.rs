/// Expand `$VAR` and `${VAR}` references from the process environment.
///
/// References to unset variables are left as written. A `$` that does not
/// start a valid name is copied through.
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |name| std::env::var(name).ok())
}

/// Expansion with an explicit lookup, used by [`expand_env_vars`].
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, reference_len) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        let valid = !name.is_empty() && !name.starts_with(|c: char| c.is_ascii_digit());
        match (valid, valid.then(|| lookup(name)).flatten()) {
            (true, Some(expanded)) => {
                result.push_str(&expanded);
                rest = &after[reference_len..];
            }
            (true, None) => {
                result.push_str(&rest[pos..pos + 1 + reference_len]);
                rest = &after[reference_len..];
            }
            (false, _) => {
                result.push('$');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
