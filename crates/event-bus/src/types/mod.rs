pub mod build_summary;
