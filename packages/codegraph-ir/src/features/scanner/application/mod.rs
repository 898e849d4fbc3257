pub mod scan_usecase;
