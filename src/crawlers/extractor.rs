use crate::HarvestError;
use crate::results::ItemMetadata;
use crate::selectors::{METADATA_CONTAINER, POEM_AUTHOR, POEM_BODY, POEM_LINE, POEM_TITLE};
use crate::session::{PageElement, PageSession};
use crate::throttle::Throttle;

/// Visits a poem page and reads its title, author and lines.
///
/// Only navigation and locating the metadata region can fail the call; each
/// field is read on its own and simply stays empty when the page lacks it.
pub async fn extract<S: PageSession>(
    session: &S,
    throttle: &Throttle,
    url: &str,
) -> Result<ItemMetadata, HarvestError> {
    session
        .navigate(url)
        .await
        .map_err(|source| HarvestError::Navigation {
            url: url.to_string(),
            source,
        })?;
    throttle.delay().await;

    let container = session
        .find(METADATA_CONTAINER)
        .await
        .map_err(|source| HarvestError::MissingContainer {
            url: url.to_string(),
            source,
        })?;

    let title = poem_title(&container).await;
    let author = poem_author(&container).await;
    let lines = poem_lines(&container).await;

    if title.is_none() || author.is_none() || lines.is_none() {
        ::log::debug!(
            "Partial metadata for {} (title: {}, author: {}, text: {})",
            url,
            title.is_some(),
            author.is_some(),
            lines.is_some()
        );
    }

    Ok(ItemMetadata {
        url: url.to_string(),
        poem_title: title.unwrap_or_default(),
        author: author.unwrap_or_default(),
        poem_text: lines.unwrap_or_default(),
    })
}

async fn poem_title<E: PageElement>(container: &E) -> Option<String> {
    let heading = container.find(POEM_TITLE).await.ok()?;
    heading.text().await.ok().map(|t| t.trim().to_string())
}

async fn poem_author<E: PageElement>(container: &E) -> Option<String> {
    let anchor = container.find(POEM_AUTHOR).await.ok()?;
    anchor.text().await.ok().map(|t| t.trim().to_string())
}

/// Text of each direct child of the poem body, in document order
async fn poem_lines<E: PageElement>(container: &E) -> Option<Vec<String>> {
    let body = container.find(POEM_BODY).await.ok()?;
    let children = body.find_all(POEM_LINE).await.ok()?;

    let mut lines = Vec::with_capacity(children.len());
    for child in children.iter() {
        lines.push(child.text().await.ok()?);
    }
    Some(lines)
}
