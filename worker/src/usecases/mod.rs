pub mod cleanup_dev_logs;
