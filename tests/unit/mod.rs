/// Unit tests for the domain rules, run against the public API
mod domain_tests;
mod schedule_tests;
