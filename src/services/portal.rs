//! Markup assumptions about the cadastral lookup portal.
//!
//! Any change on the site's side breaks these silently (fields come back
//! "Not found") or loudly (attempts fail and are retried).

use super::Locator;

pub const SEARCH_URL: &str =
    "https://www1.sedecatastro.gob.es/CYCBienInmueble/OVCBusqueda.aspx?from=NuevoVisor&pest=";

/// Lowercase markers of the portal's denial and failure pages.
pub const ACCESS_ERROR_MARKERS: [&str; 2] = ["access denied", "server error"];

pub const COOKIE_ACCEPT: Locator = Locator::Id("cookie-accept");

pub const REFERENCE_INPUT: Locator = Locator::Id("ct100_Contenido_txtRC2");
pub const SUBMIT_BUTTON: Locator = Locator::Id("ct100_Contenido_btnDatos");
pub const VALIDATION_MESSAGE: Locator = Locator::Id("ct100_Contenido_lblErrorRC");

/// Present once the result view has rendered.
pub const PRIMARY_USE_LABEL: Locator = Locator::XPath("//span[contains(text(), 'Uso principal')]");

pub const PRIMARY_USE_VALUE: Locator = Locator::XPath(
    "//span[contains(text(), 'Uso principal')]/following-sibling::div/span/label",
);
pub const BUILT_AREA_VALUE: Locator = Locator::XPath(
    "//span[contains(text(), 'Superficie construida')]/following-sibling::div/span/label",
);
pub const CONSTRUCTION_YEAR_VALUE: Locator = Locator::XPath(
    "//span[contains(text(), 'Año construcción')]/following-sibling::div/span/label",
);

/// One way of reaching the "search by cadastral reference" tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStrategy {
    pub name: &'static str,
    pub locator: Locator,
}

/// Tried in order; the first one that clicks wins.
pub const TAB_STRATEGIES: [TabStrategy; 3] = [
    TabStrategy {
        name: "link target",
        locator: Locator::XPath("//a[contains(@href, 'refcat')]"),
    },
    TabStrategy {
        name: "link text",
        locator: Locator::PartialLinkText("Referencia catastral"),
    },
    TabStrategy {
        name: "role and target",
        locator: Locator::Css("a[role='tab'][href*='refcat']"),
    },
];

pub fn is_access_error(page_source: &str) -> bool {
    let page_source = page_source.to_lowercase();
    ACCESS_ERROR_MARKERS
        .iter()
        .any(|&marker| page_source.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::is_access_error;

    #[test]
    fn access_error_markers_ignore_case() {
        assert!(is_access_error("<h1>Access Denied</h1>"));
        assert!(is_access_error("<title>500 - Internal SERVER ERROR</title>"));
    }

    #[test]
    fn regular_search_page_is_not_an_access_error() {
        assert!(!is_access_error(
            "<html><a href='#refcat2'>Referencia catastral</a></html>"
        ));
    }
}
