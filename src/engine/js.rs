//! DOM probe scripts for the catalog pages.
//!
//! Every interaction with the page goes through `PageSession::evaluate`
//! with one of these snippets. Each snippet is a self-contained IIFE that
//! returns plain JSON; no state is kept in the page. Selector lists are
//! deliberately loose (candidate patterns tried in priority order) so
//! minor markup drift on the site does not break the engine.

/// Candidate selectors for the catalog's search box.
const SEARCH_INPUT_SELECTOR: &str = "input[type=\\\"search\\\"], \
    input[placeholder*=\\\"Busca\\\"], input[placeholder*=\\\"buscar\\\"], \
    input[aria-label*=\\\"Buscar\\\"], input[aria-label*=\\\"buscar\\\"]";

/// True once a search input exists and is enabled.
pub const SEARCH_INPUT_READY: &str = r#"(() => {
    const el = document.querySelector("input[type=\"search\"], input[placeholder*=\"Busca\"], input[placeholder*=\"buscar\"], input[aria-label*=\"Buscar\"], input[aria-label*=\"buscar\"]");
    return !!el && !el.disabled;
})()"#;

/// Fill the search box with `query` and submit it.
///
/// Dispatches the input event (the page listens for it) and then both an
/// Enter keypress and a form submit; whichever the page honors wins.
pub fn submit_search(query: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector("{SEARCH_INPUT_SELECTOR}");
    if (!el) return false;
    el.focus();
    el.value = "{}";
    el.dispatchEvent(new Event("input", {{ bubbles: true }}));
    el.dispatchEvent(new KeyboardEvent("keydown", {{ key: "Enter", bubbles: true }}));
    el.dispatchEvent(new KeyboardEvent("keyup", {{ key: "Enter", bubbles: true }}));
    if (el.form && typeof el.form.requestSubmit === "function") el.form.requestSubmit();
    return true;
}})()"#,
        sanitize_js_string(query)
    )
}

/// Try to click through to the first product in the result list.
///
/// Link candidates are tried in fixed priority order; the same pass also
/// checks for the explicit no-results marker so the caller can tell
/// "nothing yet" from "nothing ever".
pub const CLICK_PRODUCT_LINK: &str = r#"(() => {
    const texts = ["ver producto", "ver detalle", "detalle"];
    const candidates = [...document.querySelectorAll("a, button")];
    for (const wanted of texts) {
        const el = candidates.find((c) => (c.textContent || "").trim().toLowerCase().includes(wanted));
        if (el) {
            try { el.scrollIntoView({ block: "center" }); } catch (e) {}
            el.click();
            return { clicked: true, noResults: false };
        }
    }
    const byHref = document.querySelector("a[href*=\"producto\"]");
    if (byHref) {
        byHref.click();
        return { clicked: true, noResults: false };
    }
    const body = ((document.body && document.body.innerText) || "").toLowerCase();
    const noResults = /sin resultados|no se encontraron|no hay resultados/.test(body);
    return { clicked: false, noResults: noResults };
})()"#;

/// The product detail page's title, or null while it has not rendered.
pub const PRODUCT_TITLE: &str = r#"(() => {
    const el = document.querySelector("h1.page-title");
    if (!el) return null;
    const title = (el.innerText || el.textContent || "").trim();
    return title.length ? title : null;
})()"#;

/// True once the region `<select>` exists on the detail page.
pub const REGION_SELECT_READY: &str =
    r##"(() => !!document.querySelector("#attribute2276"))()"##;

/// Select a region by its site code and fire the change event that kicks
/// off the supplier-table reload.
pub fn select_region(value: &str) -> String {
    format!(
        r##"(() => {{
    const sel = document.querySelector("#attribute2276");
    if (!sel) return false;
    sel.value = "{}";
    sel.dispatchEvent(new Event("change", {{ bubbles: true }}));
    return true;
}})()"##,
        sanitize_js_string(value)
    )
}

/// Best-effort reveal of the supplier list: the table may sit collapsed
/// behind a toggle and/or below the fold. Never fails the probe.
pub const REVEAL_SUPPLIERS: &str = r##"(() => {
    let acted = false;
    const btn = document.querySelector("#go-suppliers-btn");
    if (btn) {
        try { btn.scrollIntoView({ block: "center" }); btn.click(); acted = true; } catch (e) {}
    }
    const list = document.querySelector("#suppliers_list");
    if (list) {
        try { list.scrollIntoView({ behavior: "instant", block: "start" }); acted = true; } catch (e) {}
    } else {
        location.hash = "suppliers_list";
    }
    return acted;
})()"##;

/// Current supplier-table state: visible row count plus whether one of the
/// recognized "no suppliers" phrases is on the page.
pub const TABLE_STATE: &str = r#"(() => {
    let visible = 0;
    for (const row of document.querySelectorAll("tr.flag-row-seller")) {
        const style = window.getComputedStyle(row);
        if (style && style.display !== "none" && style.visibility !== "hidden") visible++;
    }
    const body = ((document.body && document.body.innerText) || "").toLowerCase();
    const empty = /sin proveedores|no se encontraron|no hay proveedores|sin resultados|no hay resultados/.test(body);
    return { visible: visible, empty: empty };
})()"#;

/// Snapshot of every supplier row: visibility and the raw price attribute.
/// Filtering and the minimum happen on the Rust side.
pub const SUPPLIER_ROWS: &str = r#"(() => {
    const out = [];
    for (const row of document.querySelectorAll("tr.flag-row-seller")) {
        const style = window.getComputedStyle(row);
        const visible = !!style && style.display !== "none" && style.visibility !== "hidden";
        const cell = row.querySelector("td.wk-ap-price[data-base]");
        out.push({ base: cell ? cell.getAttribute("data-base") : null, visible: visible });
    }
    return out;
})()"#;

/// Sanitize a string for safe injection into a JavaScript string literal.
///
/// Escapes everything that could break out of the string context:
/// backslashes, quotes, backticks, newlines, and angle brackets (so a
/// reflected value can never become `</script>`). Null bytes are dropped.
pub fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_js_string("2144208"), "2144208");
        assert_eq!(sanitize_js_string("it's"), "it\\'s");
        assert_eq!(sanitize_js_string("a\"b"), "a\\\"b");
    }

    #[test]
    fn sanitize_script_breakout() {
        let malicious = r#"</script><script>alert(1)</script>"#;
        let sanitized = sanitize_js_string(malicious);
        assert!(!sanitized.contains("</script>"));
        assert!(sanitized.contains("\\x3c/script\\x3e"));
    }

    #[test]
    fn submit_search_escapes_query() {
        let script = submit_search(r#"taladro" ; alert(1)"#);
        assert!(script.contains(r#"taladro\" ; alert(1)"#));
        assert!(!script.contains(r#"= "taladro" ;"#));
    }

    #[test]
    fn select_region_embeds_code() {
        let script = select_region("13");
        assert!(script.contains(r#"sel.value = "13";"#));
    }
}
