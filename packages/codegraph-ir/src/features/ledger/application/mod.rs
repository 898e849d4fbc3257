pub mod ledger_usecase;
