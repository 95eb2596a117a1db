//! DOM selectors and page scripts for the poetry listing and poem pages.
//!
//! The absolute XPaths point into the site's current layout and break
//! whenever it changes; keep every selector here.

use crate::session::Locator;

/// Poem anchors on a listing page
pub const ITEM_LINK: Locator = Locator::Css("a.link-underline-on.link-red");

/// The `<ul>` holding one entry per poem on a listing page
pub const TITLE_LIST: Locator =
    Locator::XPath(r#"//*[@id="mainContent"]/div/div/div[2]/div[1]/ul"#);

/// One entry inside [`TITLE_LIST`]
pub const TITLE_ITEM: Locator = Locator::Css(".flex-1");

/// Title anchor inside a [`TITLE_ITEM`]
pub const TITLE_ANCHOR: Locator = ITEM_LINK;

/// Tag buttons inside a [`TITLE_ITEM`]
pub const TITLE_TAG: Locator = Locator::Css("a.button-small.button-gray.uppercase");

pub const NEXT_PAGE: Locator = Locator::Css(r#"[aria-label="Next Page"]"#);

/// Region of a poem page holding title, author and body
pub const METADATA_CONTAINER: Locator =
    Locator::XPath(r#"//*[@id="mainContent"]/article/div/div[1]/div"#);

pub const POEM_TITLE: Locator = Locator::Css("h1.type-gamma");

pub const POEM_AUTHOR: Locator = Locator::Css("a.link-underline-off.link-red");

pub const POEM_BODY: Locator = Locator::Css(".poem-body");

/// Direct children of [`POEM_BODY`], one per rendered line or stanza
pub const POEM_LINE: Locator = Locator::XPath("*");

pub const PAGE_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";

pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

pub const SETTLE_SCROLL_SCRIPT: &str = "window.scrollTo(0, window.pageYOffset - 200);";

pub const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView(true);";
