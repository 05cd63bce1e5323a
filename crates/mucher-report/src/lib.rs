//! mucher-report: HTML rendering of grading reports.

pub mod html;
