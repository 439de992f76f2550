mod address_book;
mod person;
mod validation;

use crate::{address_book::address_book, person::person, validation::validation};
use log::LevelFilter;
use rivet::{Connection, Database};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub fn execute_tests<C: Connection>(db: &mut Database<C>) {
    person(db);
    address_book(db);
    validation(db);
}

/// Run a statement the records cannot express, like creating the tables.
pub(crate) fn setup<C: Connection>(db: &mut Database<C>, statements: &[&str]) {
    for sql in statements {
        db.connection()
            .execute(sql, &[])
            .unwrap_or_else(|e| panic!("Failed to run `{}`: {:#}", sql, e));
    }
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
