//! Output layout of an inscription passing transaction
//!
//! ```text
//!  input:   [ ........ value ........................................ ]
//!                       ^ inscribed sat at `offset`
//!  outputs: [ first change ][ inscription ][ second change ][   fee   ]
//! ```
//!
//! The change outputs are optional padding. The front padding keeps the sats before
//! the inscribed sat out of the inscription output; the back padding returns the
//! sats after it. Amounts of zero stand for outputs that are not created.

use log::debug;

use super::dimensions::{Dimensions, SizeBound};
use super::InscriptionError;

/// The four amounts of an inscription passing transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OutputLayout {
    pub first_change_output: u64,
    pub inscription_output: u64,
    pub second_change_output: u64,
    pub fee_output: u64,
}

impl OutputLayout {
    pub fn new(
        first_change_output: u64,
        inscription_output: u64,
        second_change_output: u64,
        fee_output: u64,
    ) -> Self {
        OutputLayout {
            first_change_output,
            inscription_output,
            second_change_output,
            fee_output,
        }
    }

    /// Sum of all outputs including the fee, i.e. the required input value.
    /// `None` if the amounts overflow.
    pub fn total(&self) -> Option<u64> {
        [
            self.inscription_output,
            self.second_change_output,
            self.fee_output,
        ]
        .iter()
        .try_fold(self.first_change_output, |acc, &v| acc.checked_add(v))
    }

    /// Number of transaction outputs (the fee is not an output)
    pub fn output_count(&self) -> usize {
        [
            self.first_change_output,
            self.inscription_output,
            self.second_change_output,
        ]
        .iter()
        .filter(|&&v| v > 0)
        .count()
    }

    pub fn padding(&self) -> Padding {
        Padding::from_flags(self.first_change_output > 0, self.second_change_output > 0)
    }
}

/// Which change outputs surround the inscription output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Padding {
    None,
    Start,
    End,
    Both,
}

impl Padding {
    /// Search order of [`find_output_layout`]: fewest outputs first
    pub const ALL: [Padding; 4] = [Padding::None, Padding::Start, Padding::End, Padding::Both];

    fn from_flags(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, false) => Padding::None,
            (true, false) => Padding::Start,
            (false, true) => Padding::End,
            (true, true) => Padding::Both,
        }
    }

    pub fn has_start(&self) -> bool {
        matches!(self, Padding::Start | Padding::Both)
    }

    pub fn has_end(&self) -> bool {
        matches!(self, Padding::End | Padding::Both)
    }
}

/// Bounds on the output values of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct LayoutConstraints {
    /// Smallest change output worth creating; smaller leftovers go to the fee
    pub min_change_output: u64,
    pub min_inscription_output: u64,
    pub max_inscription_output: u64,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        LayoutConstraints {
            min_change_output: 10_000,
            min_inscription_output: 10_000,
            max_inscription_output: 20_000,
        }
    }
}

/// Fee of a layout as a function of how many change outputs it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeModel {
    /// Weight of everything but the outputs: overhead and inputs
    pub fixed_weight: u64,
    pub inscription_output_weight: u64,
    pub change_output_weight: u64,
    pub fee_rate_sat_kb: u64,
}

impl FeeModel {
    pub fn new(
        fixed_weight: u64,
        inscription_output_weight: u64,
        change_output_weight: u64,
        fee_rate_sat_kb: u64,
    ) -> Self {
        FeeModel {
            fixed_weight,
            inscription_output_weight,
            change_output_weight,
            fee_rate_sat_kb,
        }
    }

    /// Build from the dimensions of the inputs and of one output of each kind.
    ///
    /// Input weights use the upper end of the ECDSA signature range.
    pub fn from_dimensions(
        inputs: &Dimensions,
        inscription_output: &Dimensions,
        change_output: &Dimensions,
        fee_rate_sat_kb: u64,
    ) -> Self {
        FeeModel::new(
            inputs.weight(SizeBound::Max) as u64,
            inscription_output.output_weight() as u64,
            change_output.output_weight() as u64,
            fee_rate_sat_kb,
        )
    }

    pub fn weight(&self, change_outputs: u64) -> u64 {
        self.fixed_weight + self.inscription_output_weight + change_outputs * self.change_output_weight
    }

    pub fn vsize(&self, change_outputs: u64) -> u64 {
        self.weight(change_outputs).div_ceil(4)
    }

    pub fn fee(&self, change_outputs: u64) -> Result<u64, InscriptionError> {
        self.vsize(change_outputs)
            .checked_mul(self.fee_rate_sat_kb)
            .map(|v| v.div_ceil(1000))
            .ok_or_else(|| {
                InscriptionError::AmountOverflow(format!(
                    "fee at {} sat/kB",
                    self.fee_rate_sat_kb
                ))
            })
    }
}

pub(crate) fn checked_sum(amounts: &[u64], what: &str) -> Result<u64, InscriptionError> {
    amounts
        .iter()
        .try_fold(0u64, |acc, &v| acc.checked_add(v))
        .ok_or_else(|| InscriptionError::AmountOverflow(what.to_string()))
}

/// Value of the inscription-carrying input and the position of the inscribed sat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InscriptionInput {
    pub value: u64,
    pub offset: u64,
}

/// Lay out the outputs for one padding choice.
///
/// The requested padding is an upper bound. Front padding is only created when the
/// sats before the inscribed one reach `min_change_output`; back padding only when
/// the leftover after the fee does. A leftover that cannot become back padding is
/// added to the fee, or rejected with [`InscriptionError::NoValidLayout`] when no
/// back padding was requested and the leftover would make a change output.
///
/// Without `inscription_value`, the inscription output is as small as the
/// constraints allow when back padding is requested and takes the whole remainder
/// otherwise.
pub fn layout_for_padding(
    input: InscriptionInput,
    padding: Padding,
    inscription_value: Option<u64>,
    constraints: &LayoutConstraints,
    fees: &FeeModel,
) -> Result<OutputLayout, InscriptionError> {
    if input.offset >= input.value {
        return Err(InscriptionError::InvalidSatOffset {
            offset: input.offset,
            value: input.value,
        });
    }

    let first_change_output =
        if padding.has_start() && input.offset >= constraints.min_change_output {
            input.offset
        } else {
            0
        };
    let front_outputs = u64::from(first_change_output > 0);
    // position of the inscribed sat within the inscription output
    let sat_index = input.offset - first_change_output;
    let available = input.value - first_change_output;

    let fee_without_back = fees.fee(front_outputs)?;
    let min_inscription = inscription_value
        .unwrap_or_else(|| constraints.min_inscription_output.max(sat_index + 1));
    let required = checked_sum(&[min_inscription, fee_without_back], "inscription output and fee")?;
    if available < required {
        return Err(InscriptionError::InsufficientFunds {
            available: input.value,
            required: checked_sum(&[first_change_output, required], "required input value")?,
        });
    }

    let inscription_output = match inscription_value {
        Some(v) => v,
        None if padding.has_end() => min_inscription,
        None => (available - fee_without_back).min(constraints.max_inscription_output),
    };
    if inscription_output <= sat_index
        || inscription_output < constraints.min_inscription_output
        || inscription_output > constraints.max_inscription_output
    {
        return Err(InscriptionError::NoValidLayout);
    }

    let rest = available - inscription_output;
    if padding.has_end() {
        let fee_with_back = fees.fee(front_outputs + 1)?;
        if rest >= checked_sum(&[fee_with_back, constraints.min_change_output], "back padding")? {
            return Ok(OutputLayout::new(
                first_change_output,
                inscription_output,
                rest - fee_with_back,
                fee_with_back,
            ));
        }
    } else if rest - fee_without_back >= constraints.min_change_output {
        return Err(InscriptionError::NoValidLayout);
    }

    Ok(OutputLayout::new(first_change_output, inscription_output, 0, rest))
}

/// Find the layout with the lowest fee.
///
/// A layout for a padding choice only counts if it realizes exactly the padding
/// that was asked for. Equal fees are resolved in [`Padding::ALL`] order, i.e.
/// towards fewer outputs.
pub fn find_output_layout(
    input: InscriptionInput,
    constraints: &LayoutConstraints,
    fees: &FeeModel,
) -> Result<OutputLayout, InscriptionError> {
    let mut first_error = None;
    let mut candidates = Vec::with_capacity(Padding::ALL.len());
    for padding in Padding::ALL {
        match layout_for_padding(input, padding, None, constraints, fees) {
            Ok(layout) if layout.padding() == padding => candidates.push(layout),
            Ok(layout) => {
                debug!("{:?} requested, got {:?}", padding, layout.padding());
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    // min_by_key keeps the first of equal elements
    match candidates.into_iter().min_by_key(|layout| layout.fee_output) {
        Some(layout) => {
            debug!("found {:?} layout {:?}", layout.padding(), layout);
            Ok(layout)
        }
        None => Err(first_error.unwrap_or(InscriptionError::NoValidLayout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fee model that charges nothing, so amounts are easy to follow
    fn free() -> FeeModel {
        FeeModel::new(0, 0, 0, 0)
    }

    /// 200 vbytes without change, 43 more per change output
    fn fees() -> FeeModel {
        FeeModel::new(628, 172, 172, 1000)
    }

    fn input(value: u64, offset: u64) -> InscriptionInput {
        InscriptionInput { value, offset }
    }

    #[test]
    fn test_fee_model() {
        let f = fees();
        assert_eq!(f.vsize(0), 200);
        assert_eq!(f.vsize(2), 286);
        assert_eq!(f.fee(1), Ok(243));
        assert_eq!(FeeModel::new(401, 0, 0, 1500).fee(0), Ok(152));
    }

    #[test]
    fn test_fee_rate_overflow_is_an_error() {
        let f = FeeModel::new(628, 172, 172, u64::MAX);
        assert!(matches!(f.fee(0), Err(InscriptionError::AmountOverflow(_))));
        assert!(matches!(
            find_output_layout(input(30_000, 0), &LayoutConstraints::default(), &f),
            Err(InscriptionError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_layout_total_overflow() {
        assert_eq!(OutputLayout::new(0, 1, 0, 2).total(), Some(3));
        assert_eq!(OutputLayout::new(u64::MAX, 1, 0, 0).total(), None);
    }

    #[test]
    fn test_explicit_inscription_without_padding() {
        let layout = layout_for_padding(
            input(20_000, 0),
            Padding::None,
            Some(19_800),
            &LayoutConstraints::default(),
            &fees(),
        )
        .unwrap();
        assert_eq!(layout, OutputLayout::new(0, 19_800, 0, 200));
        assert_eq!(layout.output_count(), 1);
    }

    #[rstest::rstest]
    #[case::three_outputs(50_000, 20_000, OutputLayout::new(20_000, 10_000, 20_000, 0), 3)]
    #[case::small_back_pad_folded(35_000, 20_000, OutputLayout::new(20_000, 10_000, 0, 5_000), 2)]
    #[case::small_front_pad_skipped(35_000, 5_000, OutputLayout::new(0, 10_000, 25_000, 0), 2)]
    #[case::both_pads_skipped(15_000, 5_000, OutputLayout::new(0, 10_000, 0, 5_000), 1)]
    fn test_both_padding(
        #[case] value: u64,
        #[case] offset: u64,
        #[case] expected: OutputLayout,
        #[case] outputs: usize,
    ) {
        let layout = layout_for_padding(
            input(value, offset),
            Padding::Both,
            None,
            &LayoutConstraints::default(),
            &free(),
        )
        .unwrap();
        assert_eq!(layout, expected);
        assert_eq!(layout.output_count(), outputs);
        assert_eq!(layout.total(), Some(value));
    }

    #[test]
    fn test_back_padding_pays_for_its_output() {
        let layout = layout_for_padding(
            input(40_000, 0),
            Padding::End,
            None,
            &LayoutConstraints::default(),
            &fees(),
        )
        .unwrap();
        assert_eq!(layout, OutputLayout::new(0, 10_000, 29_757, 243));
    }

    #[rstest::rstest]
    #[case::whole_input_inscribed(20_000, 0, OutputLayout::new(0, 19_800, 0, 200))]
    #[case::back_pad_preferred_over_both(45_000, 12_000, OutputLayout::new(0, 12_001, 32_756, 243))]
    #[case::sat_near_end(32_000, 25_000, OutputLayout::new(25_000, 6_757, 0, 243))]
    #[case::small_offset(35_000, 100, OutputLayout::new(0, 546, 34_211, 243))]
    #[case::cheapest_over_fewest_outputs(30_000, 0, OutputLayout::new(0, 546, 29_211, 243))]
    fn test_find_output_layout(
        #[case] value: u64,
        #[case] offset: u64,
        #[case] expected: OutputLayout,
    ) {
        let constraints = LayoutConstraints {
            min_inscription_output: 546,
            ..LayoutConstraints::default()
        };
        let layout = find_output_layout(input(value, offset), &constraints, &fees());
        assert_eq!(layout, Ok(expected));
        assert_eq!(expected.total(), Some(value));
    }

    #[test]
    fn test_leftover_goes_to_back_padding_instead_of_fee() {
        let constraints = LayoutConstraints::default();
        let no_padding =
            layout_for_padding(input(30_000, 0), Padding::None, None, &constraints, &fees())
                .unwrap();
        assert_eq!(no_padding, OutputLayout::new(0, 20_000, 0, 10_000));

        let layout = find_output_layout(input(30_000, 0), &constraints, &fees()).unwrap();
        assert_eq!(layout, OutputLayout::new(0, 10_000, 19_757, 243));
        assert_eq!(layout.padding(), Padding::End);
    }

    #[test]
    fn test_equal_fees_prefer_fewer_outputs() {
        let constraints = LayoutConstraints::default();
        let back_padded =
            layout_for_padding(input(20_000, 0), Padding::End, None, &constraints, &free())
                .unwrap();
        assert_eq!(back_padded, OutputLayout::new(0, 10_000, 10_000, 0));

        let layout = find_output_layout(input(20_000, 0), &constraints, &free()).unwrap();
        assert_eq!(layout, OutputLayout::new(0, 20_000, 0, 0));
    }

    #[test]
    fn test_insufficient_funds() {
        assert_eq!(
            find_output_layout(
                input(10_100, 0),
                &LayoutConstraints::default(),
                &fees()
            ),
            Err(InscriptionError::InsufficientFunds {
                available: 10_100,
                required: 10_200
            })
        );
    }

    #[test]
    fn test_leftover_without_back_padding_is_no_valid_layout() {
        assert_eq!(
            layout_for_padding(
                input(50_000, 0),
                Padding::None,
                None,
                &LayoutConstraints::default(),
                &fees(),
            ),
            Err(InscriptionError::NoValidLayout)
        );
    }

    #[test]
    fn test_sat_outside_input() {
        assert_eq!(
            find_output_layout(input(1_000, 1_000), &LayoutConstraints::default(), &free()),
            Err(InscriptionError::InvalidSatOffset {
                offset: 1_000,
                value: 1_000
            })
        );
    }

    macro_rules! conservation_tests {
        ($($name:ident: $value:expr, $offset:expr;)*) => {
            $(
                ::pastey::paste! {
                    #[test]
                    fn [<test_conservation_ $name>]() {
                        for padding in Padding::ALL {
                            let result = layout_for_padding(
                                input($value, $offset),
                                padding,
                                None,
                                &LayoutConstraints::default(),
                                &fees(),
                            );
                            if let Ok(layout) = result {
                                assert_eq!(layout.total(), Some($value), "{:?}", padding);
                                assert!(layout.fee_output >= fees().fee(layout.output_count() as u64 - 1).unwrap());
                                assert!(layout.inscription_output > $offset - layout.first_change_output);
                            }
                        }
                    }
                }
            )*
        };
    }

    conservation_tests! {
        small_input: 15_000, 0;
        sat_at_end: 30_000, 29_999;
        sat_in_middle: 60_000, 25_000;
        large_input: 1_000_000, 400_000;
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_constraints_deserialize_with_defaults() {
        let c: LayoutConstraints =
            serde_json::from_str(r#"{"minChangeOutput": 546}"#).unwrap();
        assert_eq!(c.min_change_output, 546);
        assert_eq!(c.max_inscription_output, 20_000);
    }
}
