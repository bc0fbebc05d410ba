//! Integration tests for the intake watcher.

use std::path::Path;

use billrecon_cli::intake::{IntakeOutcome, IntakeWatcher};
use billrecon_core::{
    DocumentProcessor, IntakeConfig, JsonFileSink, PassthroughFieldExtractor, PlainTextExtractor,
    ReconConfig, ReconciliationEngine, ReferenceCache, ReferenceConfig,
};
use tempfile::TempDir;

fn write_references(dir: &Path) {
    std::fs::write(
        dir.join("LloydsCurrentOwnership 28-Apr-2025.csv"),
        "IMO No,Vessel Name,Technical Manager\n8423154,LSC Boat V,Lloyd's Shipping Co.\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("MDM Live Customers 30-Apr-2025.csv"),
        "NameInvoiceAddress,Code,AddressCareOf_Inv,AddressPOBox_Inv,AddressCity_Inv,\
         AddressCounty_Inv,AddressState_Inv,AddressZIPCode_Inv,AddressCountry_Inv\n\
         Lloyd's Shipping Co.,C-1001,,,Oslo,,,0150,Norway\n",
    )
    .unwrap();
}

struct Fixture {
    _root: TempDir,
    references: std::path::PathBuf,
    intake: IntakeConfig,
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let references = root.path().join("data");
    std::fs::create_dir_all(&references).unwrap();
    let intake = IntakeConfig {
        directory: root.path().join("inbox"),
        processed_directory: root.path().join("inbox/processed"),
        failed_directory: root.path().join("inbox/failed"),
        output_directory: Some(root.path().join("results")),
        extensions: vec!["txt".to_string()],
        poll_interval_secs: 1,
    };
    std::fs::create_dir_all(&intake.directory).unwrap();
    Fixture {
        _root: root,
        references,
        intake,
    }
}

fn watcher(fixture: &Fixture) -> IntakeWatcher<ReferenceCache> {
    let config = ReconConfig {
        reference: ReferenceConfig {
            directory: fixture.references.clone(),
            ..ReferenceConfig::default()
        },
        intake: fixture.intake.clone(),
        ..ReconConfig::default()
    };
    let output_dir = fixture.intake.output_directory.clone().unwrap();
    let processor = DocumentProcessor::new(
        PlainTextExtractor,
        PassthroughFieldExtractor,
        JsonFileSink::new(output_dir),
        ReconciliationEngine::from_config(&config),
    );
    IntakeWatcher::new(fixture.intake.clone(), processor)
}

#[test]
fn processes_and_archives_documents() {
    let fixture = fixture();
    write_references(&fixture.references);
    let inbox = &fixture.intake.directory;
    std::fs::write(
        inbox.join("order-17.txt"),
        "```json\n{\"billing_counterpart\": \"Lloyd's Shipping Co.\", \"vessel_number\": \"8423154\", \"billing_address_full\": \"Oslo, 0150, Norway\"}\n```",
    )
    .unwrap();
    std::fs::write(inbox.join("order-18.txt"), "I could not find any billing details.").unwrap();
    std::fs::write(inbox.join("notes.md"), "ignored").unwrap();

    let mut outcomes = Vec::new();
    let count = watcher(&fixture)
        .drain(|outcome| outcomes.push(format!("{outcome:?}")))
        .unwrap();
    assert_eq!(count, 2);

    let processed = fixture.intake.processed_directory.join("order-17.txt");
    let failed = fixture.intake.failed_directory.join("order-18.txt");
    assert!(processed.exists());
    assert!(failed.exists());
    assert!(inbox.join("notes.md").exists());

    let output = fixture
        .intake
        .output_directory
        .as_ref()
        .unwrap()
        .join("order-17.json");
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(written["match"]["billing_vs_manager"], true);
    assert_eq!(written["match"]["billing_address_vs_customer_address"], true);
    assert_eq!(written["from_customer_db"]["customer_code"], "C-1001");
}

#[test]
fn malformed_payload_is_reported_as_failed() {
    let fixture = fixture();
    write_references(&fixture.references);
    std::fs::write(fixture.intake.directory.join("order.txt"), "{\"vessel_name\": ").unwrap();

    let outcome = watcher(&fixture).poll_once().unwrap().unwrap();
    match outcome {
        IntakeOutcome::Failed { archived, error, .. } => {
            assert_eq!(archived, fixture.intake.failed_directory.join("order.txt"));
            assert!(error.starts_with("malformed payload"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn missing_reference_dataset_stops_the_watcher() {
    let fixture = fixture();
    let input = fixture.intake.directory.join("order.txt");
    std::fs::write(&input, "{\"vessel_name\": \"LSC Boat V\"}").unwrap();

    let err = watcher(&fixture).poll_once().unwrap_err();
    assert!(format!("{err:#}").contains("vessel reference dataset missing"));
    // The document stays in the inbox for a retry once the export is in place.
    assert!(input.exists());
}

#[test]
fn empty_inbox_yields_nothing() {
    let fixture = fixture();
    assert!(watcher(&fixture).poll_once().unwrap().is_none());
}
