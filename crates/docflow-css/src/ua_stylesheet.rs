//! User-Agent Defaults
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! Only type selectors appear here, so the sheet is kept as a per-tag table
//! instead of going through selector matching. UA declarations sort below
//! every author declaration regardless of specificity.

use std::collections::HashMap;
use std::sync::OnceLock;

use docflow_dom::{Declaration, parse_inline_style};

/// [WHATWG HTML § 15.3 Rendering: suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// A subset tuned for paged output: the page itself carries the body
/// margins, so `body` has none.
const UA_CSS: &str = r"
/* [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements) */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp {
    display: block;
}

li {
    display: list-item;
}

body {
    margin: 0;
}

/* [§ 15.3.6 Sections and headings](https://html.spec.whatwg.org/multipage/rendering.html#sections-and-headings) */
h1 {
    font-size: 2em;
    font-weight: bold;
    margin-block-start: 0.67em;
    margin-block-end: 0.67em;
}

h2 {
    font-size: 1.5em;
    font-weight: bold;
    margin-block-start: 0.83em;
    margin-block-end: 0.83em;
}

h3 {
    font-size: 1.17em;
    font-weight: bold;
    margin-block-start: 1em;
    margin-block-end: 1em;
}

h4 {
    font-weight: bold;
    margin-block-start: 1.33em;
    margin-block-end: 1.33em;
}

h5 {
    font-size: 0.83em;
    font-weight: bold;
    margin-block-start: 1.67em;
    margin-block-end: 1.67em;
}

h6 {
    font-size: 0.67em;
    font-weight: bold;
    margin-block-start: 2.33em;
    margin-block-end: 2.33em;
}

/* [§ 15.3.5 Grouping content](https://html.spec.whatwg.org/multipage/rendering.html#grouping-content) */
p, blockquote, figure, listing, plaintext, pre, xmp, dl {
    margin-block-start: 1em;
    margin-block-end: 1em;
}

blockquote, figure {
    margin-left: 40px;
    margin-right: 40px;
}

dd {
    margin-left: 40px;
}

listing, plaintext, pre, xmp {
    font-family: monospace;
    white-space: pre;
}

center {
    text-align: center;
}

hr {
    border: 1px inset;
    margin-block-start: 0.5em;
    margin-block-end: 0.5em;
}

/* [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists) */
ol, ul, menu {
    margin-block-start: 1em;
    margin-block-end: 1em;
    padding-left: 40px;
}

ul, menu {
    list-style-type: disc;
}

ol {
    list-style-type: decimal;
}

/* [§ 15.3.8 Text-level semantics](https://html.spec.whatwg.org/multipage/rendering.html#text-level-semantics) */
b, strong, th {
    font-weight: bolder;
}

em, i, cite, dfn, var, address {
    font-style: italic;
}

code, kbd, samp, tt {
    font-family: monospace;
}

u, ins {
    text-decoration: underline;
}

s, strike, del {
    text-decoration: line-through;
}

a {
    color: #0000ee;
    text-decoration: underline;
}

small {
    font-size: smaller;
}

big {
    font-size: larger;
}

sub {
    vertical-align: sub;
    font-size: smaller;
}

sup {
    vertical-align: super;
    font-size: smaller;
}

/* [§ 15.3.10 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2) */
table {
    display: table;
    border-spacing: 2px;
    border-collapse: separate;
}

caption {
    display: table-caption;
    text-align: center;
}

thead {
    display: table-header-group;
}

tbody {
    display: table-row-group;
}

tfoot {
    display: table-footer-group;
}

tr {
    display: table-row;
}

td, th {
    display: table-cell;
    padding: 1px;
}

th {
    text-align: center;
}

col {
    display: table-column;
}

colgroup {
    display: table-column-group;
}

img {
    display: inline;
}
";

type Table = HashMap<String, Vec<Declaration>>;

/// UA declarations for `tag`, in sheet order.
#[must_use]
pub fn ua_declarations(tag: &str) -> &'static [Declaration] {
    ua_table().get(tag).map_or(&[], Vec::as_slice)
}

/// The parsed table, built once per process.
fn ua_table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| parse_sheet(UA_CSS))
}

/// Split `selectors { body }` blocks, dropping comments.
fn parse_sheet(css: &str) -> Table {
    let mut table = Table::new();
    let mut rest = strip_comments(css);
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        let selectors = &rest[..open];
        let body = &rest[open + 1..close];
        let declarations: Vec<Declaration> = parse_inline_style(body, 0)
            .into_iter()
            .map(|d| Declaration::user_agent(&d.property, &d.value))
            .collect();
        for tag in selectors.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            table
                .entry(tag.to_ascii_lowercase())
                .or_default()
                .extend(declarations.iter().cloned());
        }
        rest = rest[close + 1..].to_string();
    }
    table
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = rest[start + 2..]
            .find("*/")
            .map_or("", |end| &rest[start + 2 + end + 2..]);
    }
    out.push_str(rest);
    out
}
