use crate::bundle::StatisticsBundle;
use crate::error::AnalyticsError;
use crate::stats::validate_periods_per_year;
use core_types::EquityCurve;

/// An equity curve together with the label it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveInput {
    pub label: String,
    pub curve: EquityCurve,
}

impl CurveInput {
    pub fn new(label: impl Into<String>, curve: EquityCurve) -> Self {
        Self {
            label: label.into(),
            curve,
        }
    }
}

/// The label used for the strategy at `index` when the caller supplies none.
pub fn default_label(index: usize) -> String {
    format!("Strategy {}", index + 1)
}

/// The outcome of building statistics for one labelled curve.
///
/// A failure is kept rather than propagated so the reporting layer can show "N/A" for that
/// curve and still report the others.
#[derive(Debug, Clone)]
pub struct ComparisonEntry {
    pub label: String,
    pub bundle: Result<StatisticsBundle, AnalyticsError>,
}

impl ComparisonEntry {
    pub fn build(input: &CurveInput, periods_per_year: f64) -> Self {
        let bundle = StatisticsBundle::build(&input.curve, periods_per_year);
        if let Err(e) = &bundle {
            tracing::warn!(label = %input.label, error = %e, "Statistics unavailable for curve");
        }
        Self {
            label: input.label.clone(),
            bundle,
        }
    }

    pub fn is_available(&self) -> bool {
        self.bundle.is_ok()
    }
}

/// Independent statistics for an ordered list of strategies and an optional benchmark.
///
/// Every bundle is built from its own curve only. Nothing is computed across bundles; any
/// relative comparison is left to the presentation layer.
#[derive(Debug, Clone)]
pub struct Comparison {
    periods_per_year: f64,
    strategies: Vec<ComparisonEntry>,
    benchmark: Option<ComparisonEntry>,
}

impl Comparison {
    /// Builds one bundle per curve, in order.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the strategy list is empty or `periods_per_year` is not positive. A
    /// problem with an individual curve is recorded in its entry instead.
    pub fn build(
        strategies: &[CurveInput],
        benchmark: Option<&CurveInput>,
        periods_per_year: f64,
    ) -> Result<Self, AnalyticsError> {
        validate_periods_per_year(periods_per_year)?;

        let strategies = strategies
            .iter()
            .map(|input| ComparisonEntry::build(input, periods_per_year))
            .collect();
        let benchmark = benchmark.map(|input| ComparisonEntry::build(input, periods_per_year));

        Self::from_entries(strategies, benchmark, periods_per_year)
    }

    /// Assembles entries that were built elsewhere, for example concurrently.
    pub fn from_entries(
        strategies: Vec<ComparisonEntry>,
        benchmark: Option<ComparisonEntry>,
        periods_per_year: f64,
    ) -> Result<Self, AnalyticsError> {
        validate_periods_per_year(periods_per_year)?;

        if strategies.is_empty() {
            return Err(AnalyticsError::invalid(
                "at least one strategy equity curve is required",
            ));
        }

        Ok(Self {
            periods_per_year,
            strategies,
            benchmark,
        })
    }

    pub fn periods_per_year(&self) -> f64 {
        self.periods_per_year
    }

    pub fn strategies(&self) -> &[ComparisonEntry] {
        &self.strategies
    }

    pub fn benchmark(&self) -> Option<&ComparisonEntry> {
        self.benchmark.as_ref()
    }

    /// Strategies first, then the benchmark if there is one.
    pub fn entries(&self) -> impl Iterator<Item = &ComparisonEntry> {
        self.strategies.iter().chain(self.benchmark.iter())
    }

    /// The first strategy whose statistics could be built.
    pub fn primary(&self) -> Option<(&str, &StatisticsBundle)> {
        self.strategies.iter().find_map(|entry| {
            entry
                .bundle
                .as_ref()
                .ok()
                .map(|bundle| (entry.label.as_str(), bundle))
        })
    }
}
