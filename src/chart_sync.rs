use crate::activity::ActivitySeries;

/// A chart that can swap its whole series in one go
pub trait SeriesSink {
    /// `labels` are unix seconds, parallel to `values`
    fn replace_series(&mut self, labels: Vec<i64>, values: Vec<f64>);
}

/// Pushes the activity snapshot to a chart after each successful cycle
pub struct ChartSync<S: SeriesSink> {
    sink: S,
    pushes: u64,
}

impl<S: SeriesSink> ChartSync<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, pushes: 0 }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    pub fn push(&mut self, series: &ActivitySeries) {
        let (labels, values) = series.labels_and_values();
        self.sink.replace_series(labels, values);
        self.pushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivitySample;

    #[derive(Default)]
    struct LastSeries {
        labels: Vec<i64>,
        values: Vec<f64>,
        calls: usize,
    }

    impl SeriesSink for LastSeries {
        fn replace_series(&mut self, labels: Vec<i64>, values: Vec<f64>) {
            self.labels = labels;
            self.values = values;
            self.calls += 1;
        }
    }

    #[test]
    fn push_replaces_whole_series() {
        let mut chart = ChartSync::new(LastSeries::default());
        let mut series = ActivitySeries::new();

        series.replace(vec![
            ActivitySample { timestamp: 1, count: 2 },
            ActivitySample { timestamp: 2, count: 3 },
        ]);
        chart.push(&series);
        series.replace(vec![ActivitySample { timestamp: 9, count: 1 }]);
        chart.push(&series);

        assert_eq!(chart.sink().labels, vec![9]);
        assert_eq!(chart.sink().values, vec![1.0]);
        assert_eq!(chart.sink().calls, 2);
        assert_eq!(chart.pushes(), 2);
    }
}
