use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{AppointmentBooking, Interval, OpenSlot, ShiftAssignment, TimeOfDay};
use crate::services::time::overlaps;

/// Open bookable slots for `person_id` between `start_date` and `end_date`
/// (inclusive), in date then start-time order.
///
/// Each bookable shift is tiled from its start into back-to-back slots of
/// `slot_duration_minutes`; a trailing partial slot is dropped. Slots that
/// overlap a pending or confirmed booking are skipped. The sequence is lazy
/// and is rebuilt from the inputs on every call.
pub fn available_slots<'a>(
    person_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    slot_duration_minutes: u32,
    shifts: &'a [ShiftAssignment],
    bookings: &'a [AppointmentBooking],
) -> impl Iterator<Item = OpenSlot> + 'a {
    let mut windows: Vec<&'a ShiftAssignment> = shifts
        .iter()
        .filter(|shift| shift.person_id == person_id)
        .filter(|shift| shift.status.is_bookable())
        .filter(|shift| shift.shift_date >= start_date && shift.shift_date <= end_date)
        .filter(|shift| shift.interval().is_well_formed())
        .collect();
    windows.sort_by_key(|shift| (shift.shift_date, shift.start_time));

    windows
        .into_iter()
        .filter(move |_| slot_duration_minutes > 0)
        .flat_map(move |shift| tile(shift.shift_date, shift.interval(), slot_duration_minutes))
        .filter(move |slot| !is_booked(person_id, slot, bookings))
}

fn tile(date: NaiveDate, window: Interval, step: u32) -> impl Iterator<Item = OpenSlot> {
    let first = window.start.minutes() as u32;
    let last = window.end.minutes() as u32;

    std::iter::successors(Some(first), move |start| start.checked_add(step))
        .map_while(move |start| {
            let end = start.checked_add(step).filter(|end| *end <= last)?;
            Some(OpenSlot {
                date,
                start_time: TimeOfDay::from_minutes(start)?,
                end_time: TimeOfDay::from_minutes(end)?,
            })
        })
}

fn is_booked(person_id: Uuid, slot: &OpenSlot, bookings: &[AppointmentBooking]) -> bool {
    bookings.iter().any(|booking| {
        booking.doctor_id == person_id
            && booking.appointment_date == slot.date
            && booking.status.occupies_slot()
            && overlaps(&slot.interval(), &booking.interval())
    })
}
