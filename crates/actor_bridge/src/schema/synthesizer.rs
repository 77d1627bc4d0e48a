//! Best-effort input schemas for actors that publish none.

use core::fmt::Write;

use actor_structs::{
    ActorDetail, FieldValue, InputSchema, PricingInfo, Property, PropertyType, Record,
    TEXTAREA_FORMAT,
};

/// Strings longer than this are presented as multi-line text.
const MULTILINE_THRESHOLD_CHARS: usize = 50;

/// Name of the free-text field every metadata-derived schema carries.
pub const RAW_INPUT_FIELD: &str = "input";

/// Name of the read-only pricing notice on paid actors.
pub const PRICING_FIELD: &str = "pricingInfo";

/// Derives a schema with one property per key of an example input.
///
/// No parameter is marked as required.
#[must_use]
pub fn from_example(title: &str, example: &Record) -> InputSchema {
    let mut schema = InputSchema::new(title);
    schema.description = Some("Parameters inferred from the actor's example input.".to_owned());

    for (key, value) in example {
        let mut property = Property::new(infer_type(value))
            .with_title(capitalize(key))
            .with_description(format!("Value for the `{key}` parameter."));

        if let FieldValue::Text(text) = value
            && text.chars().count() > MULTILINE_THRESHOLD_CHARS
        {
            property.format = Some(TEXTAREA_FORMAT.to_owned());
        }
        property.example = Some(value.clone());

        schema.properties.insert(key.clone(), property);
    }

    schema
}

/// Derives a schema from what the actor says about itself.
///
/// Always yields at least the free-text field.
#[must_use]
pub fn from_metadata(detail: &ActorDetail) -> InputSchema {
    let actor = &detail.actor;
    let mut schema = InputSchema::new(actor.display_title());
    schema.description.clone_from(&actor.description);

    if is_jobs_actor(detail) {
        schema.properties.insert(
            "keywords".to_owned(),
            Property::new(PropertyType::Array)
                .with_title("Keywords")
                .with_description("Job titles or keywords to search for."),
        );
        schema.properties.insert(
            "location".to_owned(),
            Property::new(PropertyType::String)
                .with_title("Location")
                .with_description("City, region or country to search in."),
        );
    }

    let pricing = detail.paid_pricing();

    let mut raw_description =
        "Free-form input passed to the actor. Use JSON if the actor expects structured input."
            .to_owned();
    if let Some(pricing) = pricing {
        raw_description.push(' ');
        raw_description.push_str(&pricing_summary(pricing));
    }
    schema.properties.insert(
        RAW_INPUT_FIELD.to_owned(),
        Property::new(PropertyType::String)
            .with_title("Input")
            .with_description(raw_description)
            .with_format(TEXTAREA_FORMAT),
    );

    if let Some(pricing) = pricing {
        let mut notice = Property::new(PropertyType::String)
            .with_title("Pricing")
            .with_description(pricing_summary(pricing));
        notice.default = Some(FieldValue::Text(price_label(pricing)));
        notice.read_only = true;
        schema.properties.insert(PRICING_FIELD.to_owned(), notice);
    }

    schema
}

fn infer_type(value: &FieldValue) -> PropertyType {
    match value {
        FieldValue::Text(_) | FieldValue::Absent => PropertyType::String,
        FieldValue::Number(_) => PropertyType::Number,
        FieldValue::Boolean(_) => PropertyType::Boolean,
        FieldValue::Sequence(_) => PropertyType::Array,
        FieldValue::Record(_) => PropertyType::Object,
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn is_jobs_actor(detail: &ActorDetail) -> bool {
    detail
        .categories
        .iter()
        .any(|category| category.to_ascii_lowercase().contains("job"))
}

fn price_label(pricing: &PricingInfo) -> String {
    let Some(price) = pricing.price_per_unit_usd else {
        return "Paid actor".to_owned();
    };
    match pricing.pricing_model.as_str() {
        "FLAT_PRICE_PER_MONTH" => format!("${price:.2} per month"),
        _ => {
            let unit = pricing.unit_name.as_deref().unwrap_or("unit");
            format!("${price:.2} per {unit}")
        }
    }
}

fn pricing_summary(pricing: &PricingInfo) -> String {
    let mut summary = format!("This is a paid actor ({}).", price_label(pricing));
    if let Some(minutes) = pricing.trial_minutes.filter(|minutes| *minutes > 0) {
        let _ = write!(summary, " A free trial of {minutes} minutes is available.");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::detail;

    fn example(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_example_infers_types() {
        let schema = from_example(
            "Search",
            &example(r#"{"query": "foo", "limit": 5, "flag": true}"#),
        );

        let kinds: Vec<_> = schema
            .properties
            .iter()
            .map(|(key, property)| (key.as_str(), property.kind))
            .collect();
        assert_eq!(
            kinds,
            [
                ("query", PropertyType::String),
                ("limit", PropertyType::Number),
                ("flag", PropertyType::Boolean),
            ]
        );
        assert!(schema.required.is_none());
        assert_eq!(schema.properties["query"].title.as_deref(), Some("Query"));
        assert!(
            schema.properties["limit"]
                .description
                .as_deref()
                .unwrap()
                .contains("limit")
        );
    }

    #[test]
    fn test_from_example_nested_and_absent() {
        let schema = from_example(
            "Nested",
            &example(r#"{"urls": ["a"], "proxy": {"on": true}, "cookie": null}"#),
        );
        assert_eq!(schema.properties["urls"].kind, PropertyType::Array);
        assert_eq!(schema.properties["proxy"].kind, PropertyType::Object);
        assert_eq!(schema.properties["cookie"].kind, PropertyType::String);
    }

    #[test]
    fn test_long_string_is_multiline() {
        let long = "x".repeat(120);
        let mut record = Record::new();
        record.insert("prompt".to_owned(), FieldValue::Text(long));
        record.insert("short".to_owned(), FieldValue::from("brief"));

        let schema = from_example("Prompted", &record);
        assert_eq!(
            schema.properties["prompt"].format.as_deref(),
            Some(TEXTAREA_FORMAT)
        );
        assert_eq!(schema.properties["short"].format, None);
    }

    #[test]
    fn test_from_metadata_minimal() {
        let schema = from_metadata(&detail("A"));
        assert_eq!(schema.title, "Actor A");
        let keys: Vec<_> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, [RAW_INPUT_FIELD]);
    }

    #[test]
    fn test_from_metadata_jobs_category() {
        let mut actor = detail("J");
        actor.categories = vec!["JOBS".to_owned()];
        let schema = from_metadata(&actor);
        let keys: Vec<_> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["keywords", "location", RAW_INPUT_FIELD]);
    }

    #[test]
    fn test_from_metadata_paid_actor() {
        let mut actor = detail("P");
        actor.pricing_infos.push(PricingInfo {
            pricing_model: "FLAT_PRICE_PER_MONTH".to_owned(),
            price_per_unit_usd: Some(30.0),
            trial_minutes: Some(1440),
            unit_name: None,
        });

        let schema = from_metadata(&actor);
        let notice = &schema.properties[PRICING_FIELD];
        assert!(notice.read_only);
        assert_eq!(
            notice.default,
            Some(FieldValue::from("$30.00 per month"))
        );

        let raw = schema.properties[RAW_INPUT_FIELD].description.as_deref().unwrap();
        assert!(raw.contains("$30.00 per month"));
        assert!(raw.contains("1440 minutes"));
    }

    #[test]
    fn test_pricing_summary_trial() {
        let mut pricing = PricingInfo {
            pricing_model: "PRICE_PER_DATASET_ITEM".to_owned(),
            price_per_unit_usd: Some(0.5),
            trial_minutes: Some(60),
            unit_name: Some("result".to_owned()),
        };
        assert_eq!(
            pricing_summary(&pricing),
            "This is a paid actor ($0.50 per result). A free trial of 60 minutes is available."
        );

        pricing.trial_minutes = Some(0);
        assert_eq!(
            pricing_summary(&pricing),
            "This is a paid actor ($0.50 per result)."
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("maxItems"), "MaxItems");
        assert_eq!(capitalize(""), "");
    }
}
