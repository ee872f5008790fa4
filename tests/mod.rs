//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_config, build_test_config_with_urls, create_default_job, create_default_receipt,
    RecordingObserver, DUMMY_DOC_HASH, DUMMY_DOC_HASH_2, DUMMY_PROOF, DUMMY_SUBJECT_ID,
    DUMMY_TX_HASH, TEST_ADMIN_TOKEN,
};

#[allow(unused_imports)]
pub use helpers_mock_server::{
    mount_block_number, mount_block_number_once, mount_submit_error, mount_submit_error_n_times,
    mount_submit_success, mount_tx_receipt, mount_tx_receipt_null, rpc_error, rpc_result,
};
