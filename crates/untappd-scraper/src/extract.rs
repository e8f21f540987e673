//! Beer page field extraction.
//!
//! Each schema field is read from the first element carrying its class name.
//! Values are returned exactly as rendered; see [`crate::normalize`] for the
//! unit and separator stripping done afterwards.

use std::time::Duration;

use untappd_core::BeerRecord;

use crate::driver::{By, Element, Session};
use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeerField {
    Name,
    Brewery,
    Style,
    Abv,
    Ibu,
    Rating,
    Raters,
    Date,
}

impl BeerField {
    pub const ALL: [BeerField; 8] = [
        BeerField::Name,
        BeerField::Brewery,
        BeerField::Style,
        BeerField::Abv,
        BeerField::Ibu,
        BeerField::Rating,
        BeerField::Raters,
        BeerField::Date,
    ];

    /// Field name, which is also the class name the site uses for it.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BeerField::Name => "name",
            BeerField::Brewery => "brewery",
            BeerField::Style => "style",
            BeerField::Abv => "abv",
            BeerField::Ibu => "ibu",
            BeerField::Rating => "rating",
            BeerField::Raters => "raters",
            BeerField::Date => "date",
        }
    }

    fn context(self) -> &'static str {
        match self {
            BeerField::Name => "beer field `name`",
            BeerField::Brewery => "beer field `brewery`",
            BeerField::Style => "beer field `style`",
            BeerField::Abv => "beer field `abv`",
            BeerField::Ibu => "beer field `ibu`",
            BeerField::Rating => "beer field `rating`",
            BeerField::Raters => "beer field `raters`",
            BeerField::Date => "beer field `date`",
        }
    }

    fn assign(self, record: &mut BeerRecord, value: String) {
        let slot = match self {
            BeerField::Name => &mut record.name,
            BeerField::Brewery => &mut record.brewery,
            BeerField::Style => &mut record.style,
            BeerField::Abv => &mut record.abv,
            BeerField::Ibu => &mut record.ibu,
            BeerField::Rating => &mut record.rating,
            BeerField::Raters => &mut record.raters,
            BeerField::Date => &mut record.date,
        };
        *slot = value;
    }
}

/// Where one field lives in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: BeerField,
    pub class_name: &'static str,
    /// Read this descendant's text instead of the container's.
    pub nested_tag: Option<&'static str>,
}

/// The two mutually exclusive renderings of the beer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionSpec {
    /// Truncated description holding the expand link.
    pub collapsed_class: &'static str,
    /// Full description.
    pub expanded_class: &'static str,
    pub expand_link_text: &'static str,
    /// Length of the "Show Less" affordance baked into the text node.
    pub decoration_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub fields: Vec<FieldSpec>,
    pub description: DescriptionSpec,
}

impl Default for FieldSchema {
    fn default() -> Self {
        let fields = BeerField::ALL
            .into_iter()
            .map(|field| FieldSpec {
                field,
                class_name: field.name(),
                nested_tag: (field == BeerField::Name).then_some("h1"),
            })
            .collect();
        Self {
            fields,
            // "descrption" is the site's own spelling.
            description: DescriptionSpec {
                collapsed_class: "beer-descrption-read-more",
                expanded_class: "beer-descrption-read-less",
                expand_link_text: "Show More",
                decoration_len: 10,
            },
        }
    }
}

/// Reads every schema field plus the description from the current page.
///
/// `expand_pause` is how long to wait after expanding the description.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] if a schema field or both description
///   renderings are absent. No partial record is returned.
/// - [`ScraperError::Driver`] if the browser fails a lookup or text read.
pub async fn extract_fields<S: Session>(
    session: &S,
    schema: &FieldSchema,
    identifier: &str,
    expand_pause: Duration,
) -> Result<BeerRecord, ScraperError> {
    let description = read_description(session, &schema.description, expand_pause).await?;

    let mut record = BeerRecord {
        id: identifier.to_owned(),
        name: String::new(),
        brewery: String::new(),
        style: String::new(),
        abv: String::new(),
        ibu: String::new(),
        rating: String::new(),
        raters: String::new(),
        date: String::new(),
        description,
    };

    for spec in &schema.fields {
        let value = read_field(session, spec).await?;
        spec.field.assign(&mut record, value);
    }

    Ok(record)
}

async fn read_field<S: Session>(session: &S, spec: &FieldSpec) -> Result<String, ScraperError> {
    let by = By::ClassName(spec.class_name);
    let container = session
        .find_one(by)
        .await?
        .ok_or_else(|| ScraperError::missing(spec.field.context(), by))?;

    let Some(tag) = spec.nested_tag else {
        return Ok(container.text().await?);
    };
    let nested = By::Tag(tag);
    let inner = container
        .find_one(nested)
        .await?
        .ok_or_else(|| ScraperError::missing(spec.field.context(), nested))?;
    Ok(inner.text().await?)
}

async fn read_description<S: Session>(
    session: &S,
    spec: &DescriptionSpec,
    expand_pause: Duration,
) -> Result<String, ScraperError> {
    if expand_description(session, spec).await {
        tokio::time::sleep(expand_pause).await;
    }

    let expanded = By::ClassName(spec.expanded_class);
    let collapsed = By::ClassName(spec.collapsed_class);
    let node = match session.find_one(expanded).await? {
        Some(node) => node,
        None => session
            .find_one(collapsed)
            .await?
            .ok_or_else(|| ScraperError::missing("beer description", expanded))?,
    };

    let text = node.text().await?;
    Ok(strip_decoration(&text, spec.decoration_len))
}

/// Clicks the expand link in the collapsed description. Returns `false` when
/// there is nothing to expand.
async fn expand_description<S: Session>(session: &S, spec: &DescriptionSpec) -> bool {
    let link = match session.find_one(By::ClassName(spec.collapsed_class)).await {
        Ok(Some(collapsed)) => collapsed.find_one(By::LinkText(spec.expand_link_text)).await,
        Ok(None) => Ok(None),
        Err(e) => Err(e),
    };
    let result = match link {
        Ok(Some(link)) => link.click().await,
        Ok(None) => {
            tracing::debug!("description has no expand link");
            return false;
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "could not expand description");
            false
        }
    }
}

/// Drops the last `len` characters of `text`.
#[must_use]
pub fn strip_decoration(text: &str, len: usize) -> String {
    let keep = text.chars().count().saturating_sub(len);
    text.chars().take(keep).collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
