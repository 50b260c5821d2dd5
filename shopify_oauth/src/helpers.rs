/// Merchants enter their shop in several formats: a bare handle ("acme"), or a fully qualified domain
/// ("acme.myshopify.com", or a custom domain). Bare handles get the standard suffix appended; anything with a dot is
/// passed through unchanged.
pub fn normalize_shop_domain(shop: &str) -> String {
    if shop.contains('.') {
        shop.to_string()
    } else {
        format!("{shop}.myshopify.com")
    }
}

#[cfg(test)]
mod test {
    use super::normalize_shop_domain;

    #[test]
    fn bare_handles_get_the_standard_suffix() {
        assert_eq!(normalize_shop_domain("acme"), "acme.myshopify.com");
    }

    #[test]
    fn qualified_domains_are_unchanged() {
        assert_eq!(normalize_shop_domain("acme.myshopify.com"), "acme.myshopify.com");
        assert_eq!(normalize_shop_domain("shop.example.com"), "shop.example.com");
    }
}
