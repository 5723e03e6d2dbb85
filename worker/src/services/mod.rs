pub mod retention_loop;
