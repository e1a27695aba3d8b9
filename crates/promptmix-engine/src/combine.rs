use std::collections::{BTreeSet, HashMap, HashSet};

use rand::Rng;
use tracing::{debug, info, warn};

use promptmix_core::{
    Config, Fragment, Library, LibraryValue, PickMode, Template, VALUE_SEP, format_fragments,
};

use crate::describe::ImageDescriber;
use crate::errors::EngineError;
use crate::report::BatchReport;
use crate::sampling::{
    filter_by_category, pick_uniform, pick_weighted, pick_weighted_many, shuffled_prefix,
};
use crate::session::Session;

/// Retry budget for a single unique combination.
const UNIQUE_RETRIES: usize = 50;
/// Retry budget per item inside a batch.
const BATCH_ITEM_RETRIES: usize = 100;

/// One sampled value, remembering its source URL when it came from an
/// image library so the async path can swap in a description.
#[derive(Debug, Clone)]
struct PickedValue {
    text: String,
    image_url: Option<String>,
}

impl PickedValue {
    fn from_value(value: &LibraryValue) -> Self {
        Self {
            text: value.text().to_string(),
            image_url: value.is_image().then(|| value.text().to_string()),
        }
    }
}

/// All values one library contributed to a combination.
#[derive(Debug, Clone)]
struct LibraryPick {
    library: String,
    values: Vec<PickedValue>,
}

/// Generate one random-join combination.
///
/// Every enabled library passes a participation coin-flip, samples per its
/// pick mode, and contributes a fragment; libraries left with no eligible
/// values are omitted. The result is a template render when a template is
/// configured, otherwise fragments joined in library order.
pub fn generate_random(config: &Config, session: &mut Session) -> String {
    let picks = sample_picks(config, session);
    format_picks(config, &picks)
}

fn sample_picks(config: &Config, session: &mut Session) -> Vec<LibraryPick> {
    let category = choose_linkage_category(config, session);
    let mut picks = Vec::new();

    for library in config.enabled_libraries() {
        if !participates(library, session) {
            continue;
        }

        let values = sample_library(library, category.as_deref(), session);
        if values.is_empty() {
            continue;
        }
        picks.push(LibraryPick {
            library: library.name.clone(),
            values,
        });
    }

    picks
}

fn participates(library: &Library, session: &mut Session) -> bool {
    library.participation >= 100 || session.rng().random_range(0u8..100) < library.participation
}

/// Uniform category choice over the union of categories carried by enabled
/// libraries; `None` when linkage is off or nothing is categorized.
fn choose_linkage_category(config: &Config, session: &mut Session) -> Option<String> {
    if !config.category_linkage {
        return None;
    }

    let categories: BTreeSet<&str> = config
        .enabled_libraries()
        .flat_map(|library| library.values.iter())
        .flat_map(|value| value.categories().iter().map(String::as_str))
        .collect();
    if categories.is_empty() {
        return None;
    }

    let index = session.rng().random_range(0..categories.len());
    categories
        .iter()
        .nth(index)
        .map(|category| category.to_string())
}

fn sample_library(
    library: &Library,
    category: Option<&str>,
    session: &mut Session,
) -> Vec<PickedValue> {
    if library.pick == PickMode::Sequential {
        return session
            .next_sequential(library)
            .map(|value| vec![PickedValue::from_value(value)])
            .unwrap_or_default();
    }

    let picked: Vec<&LibraryValue> = match category {
        // Within a linkage category sampling is uniform, not weighted.
        Some(_) => {
            let eligible = filter_by_category(&library.values, category);
            if eligible.is_empty() {
                return Vec::new();
            }
            match library.pick {
                PickMode::One => pick_uniform(&eligible, session.rng())
                    .map(|value| vec![value])
                    .unwrap_or_default(),
                PickMode::Many => shuffled_prefix(&eligible, library.pick_count, session.rng()),
                PickMode::Sequential => unreachable!("handled above"),
            }
        }
        None => {
            let pool: Vec<&LibraryValue> = library.values.iter().collect();
            match library.pick {
                PickMode::One => pick_weighted(&pool, session.rng())
                    .map(|value| vec![value])
                    .unwrap_or_default(),
                PickMode::Many => pick_weighted_many(&pool, library.pick_count, session.rng()),
                PickMode::Sequential => unreachable!("handled above"),
            }
        }
    };

    picked.into_iter().map(PickedValue::from_value).collect()
}

fn format_picks(config: &Config, picks: &[LibraryPick]) -> String {
    let joined: Vec<(String, String)> = picks
        .iter()
        .map(|pick| {
            let texts: Vec<&str> = pick.values.iter().map(|value| value.text.as_str()).collect();
            (pick.library.clone(), texts.join(&VALUE_SEP.to_string()))
        })
        .collect();

    match &config.template {
        Some(source) => {
            let template = Template::parse(source);
            let values: HashMap<String, String> = joined.into_iter().collect();
            template.render(&values)
        }
        None => {
            let fragments: Vec<Fragment> = joined
                .into_iter()
                .map(|(library, value)| Fragment::new(library, value))
                .collect();
            format_fragments(&fragments)
        }
    }
}

/// Full cross-product over a shuffled prefix of each enabled library.
///
/// Ignores participation rate, categorical linkage, and the template.
/// Libraries without values are skipped rather than zeroing the product.
pub fn generate_cartesian(config: &Config, session: &mut Session) -> Vec<String> {
    let mut dimensions: Vec<(String, Vec<String>)> = Vec::new();
    for library in config.enabled_libraries() {
        let prefix = match library.pick {
            PickMode::Many => library.pick_count,
            PickMode::One | PickMode::Sequential => 1,
        };
        let pool: Vec<&LibraryValue> = library.values.iter().collect();
        let choices: Vec<String> = shuffled_prefix(&pool, prefix, session.rng())
            .into_iter()
            .map(|value| value.text().to_string())
            .collect();
        if choices.is_empty() {
            continue;
        }
        dimensions.push((library.name.clone(), choices));
    }

    if dimensions.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<Vec<Fragment>> = vec![Vec::new()];
    for (name, choices) in &dimensions {
        let mut next = Vec::with_capacity(rows.len() * choices.len());
        for row in &rows {
            for choice in choices {
                let mut row = row.clone();
                row.push(Fragment::new(name.clone(), choice.clone()));
                next.push(row);
            }
        }
        rows = next;
    }

    rows.iter().map(|row| format_fragments(row)).collect()
}

/// Generate a combination not yet in the session dedup set.
///
/// Bounded retries; after exhaustion the last attempt is returned even when
/// it is a repeat. Small pools would otherwise loop forever.
pub fn generate_unique(config: &Config, session: &mut Session) -> String {
    let mut last = String::new();
    for _ in 0..UNIQUE_RETRIES {
        last = generate_random(config, session);
        if !session.seen().contains(&last) {
            session.mark_seen(&last);
            return last;
        }
    }
    debug!(combination = %last, "unique retries exhausted, keeping duplicate");
    last
}

/// Generate `count` combinations, each unique within the batch and against
/// the session set when the pool allows it; duplicates are tolerated after
/// retry exhaustion and counted in the report.
pub fn generate_batch(
    config: &Config,
    session: &mut Session,
    count: usize,
) -> (Vec<String>, BatchReport) {
    let mut report = BatchReport::new(count);
    let mut batch = Vec::with_capacity(count);
    let mut in_batch: HashSet<String> = HashSet::new();

    info!(requested = count, "batch generation started");

    for _ in 0..count {
        let mut candidate = String::new();
        let mut unique = false;
        for _ in 0..BATCH_ITEM_RETRIES {
            candidate = generate_random(config, session);
            if !in_batch.contains(&candidate) && !session.seen().contains(&candidate) {
                unique = true;
                break;
            }
            report.record_retry();
        }

        if unique {
            session.mark_seen(&candidate);
            in_batch.insert(candidate.clone());
        } else {
            report.record_duplicate();
            warn!(combination = %candidate, "batch retries exhausted, accepting duplicate");
        }
        report.record_generated();
        batch.push(candidate);
    }

    info!(
        generated = report.generated,
        duplicates = report.duplicates_tolerated,
        retries = report.retries,
        "batch generation finished"
    );

    (batch, report)
}

fn has_image_libraries(config: &Config) -> bool {
    config
        .enabled_libraries()
        .any(Library::has_image_values)
}

/// Async [`generate_unique`]: sampled image URLs are resolved to text via
/// the injected describer, cached per URL in the session. Falls back to the
/// synchronous generator when no enabled library holds image values.
pub async fn generate_unique_described(
    config: &Config,
    session: &mut Session,
    describer: &dyn ImageDescriber,
    prompt: &str,
) -> Result<String, EngineError> {
    if !has_image_libraries(config) {
        return Ok(generate_unique(config, session));
    }

    let mut last = String::new();
    for _ in 0..UNIQUE_RETRIES {
        let mut picks = sample_picks(config, session);
        resolve_descriptions(&mut picks, session, describer, prompt).await?;
        last = format_picks(config, &picks);
        if !session.seen().contains(&last) {
            session.mark_seen(&last);
            return Ok(last);
        }
    }
    debug!(combination = %last, "unique retries exhausted, keeping duplicate");
    Ok(last)
}

/// Async [`generate_batch`] with image-description resolution.
pub async fn generate_batch_described(
    config: &Config,
    session: &mut Session,
    describer: &dyn ImageDescriber,
    prompt: &str,
    count: usize,
) -> Result<(Vec<String>, BatchReport), EngineError> {
    if !has_image_libraries(config) {
        return Ok(generate_batch(config, session, count));
    }

    let mut report = BatchReport::new(count);
    let mut batch = Vec::with_capacity(count);
    let mut in_batch: HashSet<String> = HashSet::new();

    info!(requested = count, "described batch generation started");

    for _ in 0..count {
        let mut candidate = String::new();
        let mut unique = false;
        for _ in 0..BATCH_ITEM_RETRIES {
            let mut picks = sample_picks(config, session);
            resolve_descriptions(&mut picks, session, describer, prompt).await?;
            candidate = format_picks(config, &picks);
            if !in_batch.contains(&candidate) && !session.seen().contains(&candidate) {
                unique = true;
                break;
            }
            report.record_retry();
        }

        if unique {
            session.mark_seen(&candidate);
            in_batch.insert(candidate.clone());
        } else {
            report.record_duplicate();
        }
        report.record_generated();
        batch.push(candidate);
    }

    info!(
        generated = report.generated,
        duplicates = report.duplicates_tolerated,
        "described batch generation finished"
    );

    Ok((batch, report))
}

async fn resolve_descriptions(
    picks: &mut [LibraryPick],
    session: &mut Session,
    describer: &dyn ImageDescriber,
    prompt: &str,
) -> Result<(), EngineError> {
    for pick in picks.iter_mut() {
        for value in &mut pick.values {
            let Some(url) = value.image_url.clone() else {
                continue;
            };
            if let Some(cached) = session.cached_description(&url) {
                value.text = cached.to_string();
                continue;
            }
            let description = describer.describe(&url, prompt).await?;
            session.cache_description(&url, description.clone());
            value.text = description;
        }
    }
    Ok(())
}
