//! Request and query payloads, validated with `validator` before they reach
//! the services.

pub mod directory;
pub mod materials;
pub mod notifications;
pub mod procedures;
pub mod requests;
pub mod users;

use validator::ValidationError;

pub(crate) fn validate_http_links(links: &Vec<String>) -> Result<(), ValidationError> {
    for link in links {
        let link = link.trim();
        if !(link.starts_with("http://") || link.starts_with("https://")) || link.len() > 2048 {
            let mut err = ValidationError::new("http_link");
            err.message = Some(format!("not an http(s) link: {}", link).into());
            return Err(err);
        }
    }
    Ok(())
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_must_be_http() {
        assert!(validate_http_links(&vec!["https://shop.example.com/p/1".into()]).is_ok());
        assert!(validate_http_links(&vec!["ftp://example.com".into()]).is_err());
        assert!(validate_http_links(&vec![]).is_ok());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("x").is_ok());
    }
}
