//! Local wall-clock date and time.

use chrono::{Datelike, Local, Timelike};

use crate::action::ActionRegistry;
use crate::exec::once;
use crate::term::Term;

pub(super) fn register(registry: &mut ActionRegistry) {
    registry.add_generator(".date", Some(3), |args| {
        once(move |cx| {
            let now = Local::now();
            let parts = [now.year() as i64, now.month() as i64, now.day() as i64];
            Ok(args
                .iter()
                .zip(parts)
                .all(|(arg, value)| cx.unify(arg, &Term::int(value))))
        })
    });

    registry.add_generator(".time", Some(3), |args| {
        once(move |cx| {
            let now = Local::now();
            let parts = [now.hour() as i64, now.minute() as i64, now.second() as i64];
            Ok(args
                .iter()
                .zip(parts)
                .all(|(arg, value)| cx.unify(arg, &Term::int(value))))
        })
    });
}
