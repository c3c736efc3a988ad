// This file is part of rkdl, a KDL reader and writer.
// Copyright 2022 Jeffrey Sharp
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// rkdl is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// rkdl is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with rkdl.  If not, see <http://www.gnu.org/licenses/>.

//! Decimal rendering of doubles.
//!
//! Digits come out one at a time: each fractional digit is the largest
//! that does not overshoot the value, and digits are emitted only while
//! they still change the double.  Runs of zeros and nines are queued so an
//! adjacent rounded digit can absorb them, which yields the shortest
//! round-tripping form.

use super::FloatMode;

/// Renders a finite double per the given options.
pub(super) fn render(f: f64, opts: &FloatMode) -> String {
    let negative = f < 0.0;
    let f = f.abs();

    let mut out = String::with_capacity(32);
    if negative {
        out.push('-');
    } else if opts.plus {
        out.push('+');
    }

    if f == 0.0 {
        out.push('0');
        if opts.always_write_decimal_point || opts.always_write_decimal_point_or_exponent {
            out.push_str(".0");
        }
        return out;
    }

    // Scientific notation kicks in at min_exponent orders of magnitude
    let mut exponent = f.log10().floor() as i32;
    let exp_factor;
    if exponent.abs() < opts.min_exponent {
        exponent   = 0;
        exp_factor = 1.0;
    } else {
        exp_factor = 10f64.powi(exponent);
    }

    let integer_part = (f / exp_factor).floor() as u64;
    out.push_str(&integer_part.to_string());

    let f_intpart         = integer_part as f64 * exp_factor;
    let mut written_point = false;
    let mut zeros         = 0u32;
    let mut nines         = 0u32;
    let mut queued_digit  = -1i32;
    let mut frac_so_far   = 0u64;
    let mut pos           = 0.1 * exp_factor;
    let mut f_so_far      = f_intpart;

    // while this digit makes a difference
    while f + pos != f && f_so_far < f {
        let remainder  = f - f_so_far;
        let mut digit  = (remainder / pos).floor() as i64;
        frac_so_far = frac_so_far.wrapping_mul(10).wrapping_add(digit as u64);

        // largest digit that does not overshoot
        while f_intpart + frac_so_far.wrapping_add(1) as f64 * pos <= f {
            digit += 1;
            frac_so_far = frac_so_far.wrapping_add(1);
        }

        f_so_far = f_intpart + frac_so_far as f64 * pos;

        if digit == 0 {
            zeros += 1;
        } else if digit == 9 {
            nines += 1;
        } else if digit >= 10 {
            // rounding error pushed the digit out of range; absorb it
            let overflow = (digit - 9) as u64;
            frac_so_far = frac_so_far.wrapping_sub(overflow);
        } else {
            // the queued digit is settled; flush it with its run
            if queued_digit >= 0 || zeros != 0 || nines != 0 {
                if !written_point {
                    out.push('.');
                    written_point = true;
                }
                if queued_digit >= 0 {
                    out.push((b'0' + queued_digit as u8) as char);
                }
                for _ in 0..zeros {
                    out.push('0');
                }
                for _ in 0..nines {
                    out.push('9');
                }
                zeros = 0;
                nines = 0;
            }
            queued_digit = digit as i32;
        }

        pos /= 10.0;
    }

    // Write the queued digit (if any); trailing nines round it up, and
    // trailing zeros vanish
    if queued_digit != -1 {
        if !written_point {
            out.push('.');
            written_point = true;
        }
        let digit = if nines != 0 { queued_digit + 1 } else { queued_digit };
        out.push((b'0' + digit as u8) as char);
    }

    if !written_point && opts.always_write_decimal_point {
        out.push_str(".0");
        written_point = true;
    }

    if exponent != 0 {
        out.push(if opts.capital_e { 'E' } else { 'e' });
        if exponent >= 0 && opts.exponent_plus {
            out.push('+');
        }
        out.push_str(&exponent.to_string());
    } else if !written_point && opts.always_write_decimal_point_or_exponent {
        out.push_str(".0");
    }

    out
}

// ----------------------------------------------------------------------------
