//! integration tests for trade-registry-store

use chrono::{Duration, Utc};
use tempfile::TempDir;
use trade_registry_domain::TradeId;
use trade_registry_store::{CustodyError, FileCustody, RETENTION_SECS};
use trade_registry_test_utils::{sample_pdf, sample_tx_hash};

#[tokio::test]
async fn stored_pdf_reveals_byte_identical_before_finalize() {
    // Arrange
    let (_guard, custody) = temp_custody().await;
    let trade_id = trade_id();
    let content = sample_pdf("roundtrip");

    // Act
    let record = custody
        .store(&trade_id, &sample_tx_hash(0xab), "application/pdf", &content)
        .await
        .expect("failed to store valid pdf");

    let revealed = custody.reveal(&trade_id).await.expect("failed to reveal staged pdf");

    // Assert
    assert_eq!(revealed, content);
    assert!(!record.moved());
    assert_eq!(record.filename(), format!("{}.pdf", hex::encode([0xab; 32])));
    assert!(!custody.is_moved(&trade_id));
}

#[tokio::test]
async fn reveal_fails_after_finalize() {
    // Arrange
    let (guard, custody) = temp_custody().await;
    let trade_id = trade_id();
    let content = sample_pdf("finalize");

    let record = custody
        .store(&trade_id, &sample_tx_hash(0x01), "application/pdf", &content)
        .await
        .expect("failed to store valid pdf");

    // Act
    custody.finalize(&trade_id).await.expect("failed to finalize");

    // Assert
    let err = custody.reveal(&trade_id).await.expect_err("moved file must not reveal");
    assert!(matches!(err, CustodyError::NotFound(_)), "got {err}");
    assert!(custody.is_moved(&trade_id));

    // The file itself survived the move into the private area.
    let private_copy = guard.path().join("private").join(record.filename());
    assert_eq!(std::fs::read(private_copy).expect("private copy must exist"), content);
}

#[tokio::test]
async fn finalize_is_idempotent_and_tolerates_unknown_trades() {
    // Arrange
    let (_guard, custody) = temp_custody().await;
    let trade_id = trade_id();

    custody
        .store(&trade_id, &sample_tx_hash(0x02), "application/pdf", &sample_pdf("idempotent"))
        .await
        .expect("failed to store valid pdf");

    // Act + Assert
    custody.finalize(&trade_id).await.expect("first finalize");
    custody.finalize(&trade_id).await.expect("second finalize is a no-op");
    custody.finalize(&self::trade_id()).await.expect("unknown trade is a no-op");
}

#[tokio::test]
async fn sweep_purges_strictly_after_retention_for_any_moved_state() {
    // Arrange
    let (guard, custody) = temp_custody().await;
    let staged = trade_id();
    let finalized = trade_id();

    let before_store = Utc::now();

    let staged_record = custody
        .store(&staged, &sample_tx_hash(0x03), "application/pdf", &sample_pdf("staged"))
        .await
        .expect("failed to store staged pdf");
    let finalized_record = custody
        .store(&finalized, &sample_tx_hash(0x04), "application/pdf", &sample_pdf("finalized"))
        .await
        .expect("failed to store finalized pdf");
    custody.finalize(&finalized).await.expect("failed to finalize");

    let retention = Duration::seconds(RETENTION_SECS);

    // Act + Assert: at the window boundary nothing is old enough.
    let removed = custody.sweep_expired(before_store + retention).await;
    assert_eq!(removed, 0);
    custody.reveal(&staged).await.expect("staged file must survive boundary sweep");

    // Past the window both records go, moved or not.
    let removed = custody.sweep_expired(Utc::now() + retention + Duration::seconds(5)).await;
    assert_eq!(removed, 2);

    let err = custody.reveal(&staged).await.expect_err("swept file must not reveal");
    assert!(matches!(err, CustodyError::NotFound(_)));
    assert!(!guard.path().join("uploads").join(staged_record.filename()).exists());
    assert!(!guard.path().join("private").join(finalized_record.filename()).exists());
}

#[tokio::test]
async fn uploads_failing_validation_are_rejected() {
    // Arrange
    let (_guard, custody) = temp_custody().await;

    // Act + Assert: content without the magic marker, even declared as pdf.
    let err = custody
        .store(&trade_id(), &sample_tx_hash(0x05), "application/pdf", b"GIF89a not a pdf")
        .await
        .expect_err("non-pdf content must be rejected");
    assert!(matches!(err, CustodyError::NotPdf), "got {err}");

    // Valid content with the wrong declared media type.
    let err = custody
        .store(&trade_id(), &sample_tx_hash(0x06), "text/plain", &sample_pdf("mislabeled"))
        .await
        .expect_err("mislabeled upload must be rejected");
    assert!(matches!(err, CustodyError::WrongMediaType(_)), "got {err}");
}

#[tokio::test]
async fn restoring_the_same_transaction_overwrites_in_place() {
    // Arrange
    let (_guard, custody) = temp_custody().await;
    let trade_id = trade_id();
    let tx_hash = sample_tx_hash(0x07);

    custody
        .store(&trade_id, &tx_hash, "application/pdf", &sample_pdf("first"))
        .await
        .expect("first store");

    // Act
    let second = sample_pdf("second");
    custody
        .store(&trade_id, &tx_hash, "application/pdf", &second)
        .await
        .expect("second store");

    // Assert
    assert_eq!(custody.reveal(&trade_id).await.expect("reveal"), second);
}

async fn temp_custody() -> (TempDir, FileCustody) {
    let dir = TempDir::new().expect("failed to create temporary directory");

    let custody = FileCustody::open(dir.path().join("uploads"), dir.path().join("private"))
        .await
        .expect("failed to open custody dirs");

    (dir, custody)
}

fn trade_id() -> TradeId {
    TradeId::mint(Utc::now())
}
