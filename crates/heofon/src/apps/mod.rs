//! Applications under test: routing data, navigation data and page factories.

pub mod sweetshop;
