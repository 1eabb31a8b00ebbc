//! Integration tests for CrawlerBot

mod crawl_tests;
