use std::fs;

use relief_triage::dataset::{
    DatasetCleaner, DatasetStore, FileDatasetStore, Genre, LabelPolicy, RawCategoryRecord,
    RawMessageRecord, clean, load_categories_csv, load_messages_csv, train_test_split,
};
use relief_triage::error::{Result, TriageError};
use tempfile::TempDir;

const CATEGORIES: &str = "related-1;request-0;aid_related-1;water-0";

fn message(id: i64, text: &str) -> RawMessageRecord {
    RawMessageRecord::new(id, text, Genre::Direct)
}

#[test]
fn every_cleaned_row_follows_the_schema() -> Result<()> {
    let messages = vec![
        message(1, "need water"),
        message(2, "road blocked"),
        message(3, "send tents"),
    ];
    let categories = vec![
        RawCategoryRecord::new(1, "related-1;request-1;aid_related-1;water-1"),
        RawCategoryRecord::new(2, "related-1;request-0;aid_related-0;water-0"),
        RawCategoryRecord::new(3, CATEGORIES),
    ];

    let dataset = clean(&messages, &categories)?;
    let names = ["related", "request", "aid_related", "water"];
    assert_eq!(dataset.category_names(), names);
    for m in dataset.messages() {
        assert_eq!(m.labels.len(), names.len());
    }
    assert_eq!(dataset.column(3), Some(vec![1, 0, 0]));
    assert_eq!(dataset.column(dataset.category_names().len()), None);
    Ok(())
}

#[test]
fn duplicate_records_collapse_to_the_first() -> Result<()> {
    let messages = vec![message(7, "help"), message(7, "help"), message(8, "food")];
    let categories = vec![
        RawCategoryRecord::new(7, CATEGORIES),
        RawCategoryRecord::new(8, CATEGORIES),
    ];

    let (dataset, stats) = DatasetCleaner::new().clean_with_stats(&messages, &categories)?;
    let sevens: Vec<_> = dataset.messages().iter().filter(|m| m.id == 7).collect();
    assert_eq!(sevens.len(), 1);
    assert_eq!(sevens[0].message, "help");
    assert_eq!(stats.duplicates, 1);
    assert_eq!(dataset.len(), 2);
    Ok(())
}

#[test]
fn unmatched_ids_are_dropped_by_the_join() -> Result<()> {
    let messages = vec![message(1, "water"), message(2, "no labels")];
    let categories = vec![
        RawCategoryRecord::new(1, CATEGORIES),
        RawCategoryRecord::new(99, CATEGORIES),
    ];

    let (dataset, stats) = DatasetCleaner::new().clean_with_stats(&messages, &categories)?;
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.messages()[0].id, 1);
    assert_eq!(stats.unmatched_messages, 1);
    assert_eq!(stats.unmatched_categories, 1);
    Ok(())
}

#[test]
fn inconsistent_schemas_are_rejected() {
    let messages = vec![message(1, "a"), message(2, "b")];

    let renamed = vec![
        RawCategoryRecord::new(1, "related-1;water-0"),
        RawCategoryRecord::new(2, "related-1;food-0"),
    ];
    assert!(matches!(
        clean(&messages, &renamed),
        Err(TriageError::Schema(_))
    ));

    let short = vec![
        RawCategoryRecord::new(1, "related-1;water-0"),
        RawCategoryRecord::new(2, "related-1"),
    ];
    assert!(matches!(clean(&messages, &short), Err(TriageError::Schema(_))));

    let malformed = vec![
        RawCategoryRecord::new(1, "related-1;water-0"),
        RawCategoryRecord::new(2, "related-1;water"),
    ];
    assert!(matches!(
        clean(&messages, &malformed),
        Err(TriageError::Schema(_))
    ));
}

#[test]
fn out_of_range_labels_follow_the_policy() -> Result<()> {
    let messages = vec![message(1, "flood"), message(2, "storm")];
    let categories = vec![
        RawCategoryRecord::new(1, "related-2;water-1"),
        RawCategoryRecord::new(2, "related-1;water-0"),
    ];

    assert!(matches!(
        clean(&messages, &categories),
        Err(TriageError::DataIntegrity(_))
    ));

    let clamped = DatasetCleaner::new()
        .with_policy(LabelPolicy::Clamp)
        .clean(&messages, &categories)?;
    assert_eq!(clamped.messages()[0].labels, vec![1, 1]);

    let (dropped, stats) = DatasetCleaner::new()
        .with_policy(LabelPolicy::Drop)
        .clean_with_stats(&messages, &categories)?;
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped.messages()[0].id, 2);
    assert_eq!(stats.dropped_labels, 1);
    Ok(())
}

#[test]
fn csv_tables_load_and_clean() -> Result<()> {
    let dir = TempDir::new()?;
    let messages_path = dir.path().join("messages.csv");
    let categories_path = dir.path().join("categories.csv");
    fs::write(
        &messages_path,
        "id,message,original,genre\n\
         2,\"Weather update, a cold front\",Un front froid,direct\n\
         7,Is the Hurricane over?,,social\n",
    )?;
    fs::write(
        &categories_path,
        "id,categories\n2,related-1;request-0;offer-0\n7,related-1;request-0;offer-0\n",
    )?;

    let messages = load_messages_csv(&messages_path)?;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].original.as_deref(), Some("Un front froid"));
    assert_eq!(messages[1].original, None);
    assert_eq!(messages[1].genre, Genre::Social);

    let categories = load_categories_csv(&categories_path)?;
    let dataset = clean(&messages, &categories)?;
    assert_eq!(dataset.category_names(), ["related", "request", "offer"]);
    Ok(())
}

#[test]
fn stored_dataset_keeps_its_schema() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileDatasetStore::new(dir.path().join("datasets"))?;

    let messages: Vec<_> = (1..=10).map(|i| message(i, "need help")).collect();
    let categories: Vec<_> = (1..=10)
        .map(|i| RawCategoryRecord::new(i, format!("zeta-{};alpha-0;mid-1", i % 2)))
        .collect();
    let dataset = clean(&messages, &categories)?;

    store.save("disaster_messages", &dataset)?;
    assert!(store.exists("disaster_messages"));
    let loaded = store.load("disaster_messages")?;
    assert_eq!(loaded, dataset);
    assert_eq!(loaded.category_names(), ["zeta", "alpha", "mid"]);

    let (train, test) = train_test_split(&loaded, 0.2, 3)?;
    assert_eq!(train.len() + test.len(), 10);
    assert_eq!(test.len(), 2);
    Ok(())
}
