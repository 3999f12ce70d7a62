//! Email-domain extraction used by the eligibility gate.

/// Returns the lower-cased domain part of `email`, or `None` when there is no `@` or the
/// domain is empty.
pub fn email_domain(email: &str) -> Option<String> {
	let (_, domain) = email.trim().split_once('@')?;

	if domain.is_empty() {
		return None;
	}

	Some(domain.to_ascii_lowercase())
}

/// Lower-cases and trims a configured domain so lookups match [`email_domain`].
pub fn normalize_domain(domain: &str) -> String {
	domain.trim().trim_start_matches('@').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn domain_is_lower_cased() {
		assert_eq!(email_domain("Jane.Doe@Example.COM"), Some("example.com".into()));
	}

	#[test]
	fn domain_splits_on_first_at() {
		assert_eq!(email_domain("odd@name@example.com"), Some("name@example.com".into()));
	}

	#[test]
	fn missing_domain_yields_none() {
		assert_eq!(email_domain("no-at-sign"), None);
		assert_eq!(email_domain("trailing@"), None);
		assert_eq!(email_domain(""), None);
	}

	#[test]
	fn configured_domains_normalize() {
		assert_eq!(normalize_domain(" @Example.com "), "example.com");
	}
}
