pub mod dividends_model;
pub mod dividends_service;
pub mod statement_parser;

pub use dividends_model::{DividendRecord, DividendStatistics, StatementTransaction};
pub use dividends_service::{DividendService, DividendServiceTrait};
pub use statement_parser::parse_dividend;
