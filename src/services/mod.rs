pub mod ticker_service;
