//! Designs a filter, infers its parameters back from the coefficients and
//! redesigns it from what was inferred. Both magnitude responses are plotted
//! with Plotly.
//!
//! ```text
//! cargo run --example roundtrip -- [family] [f0] [q] [order] [method] [fs]
//! cargo run --example roundtrip -- lowpass 2000 0.7 4 butterworth 48000
//! ```

use std::{env, str::FromStr};

use iir_infer::{
    design, evaluate, infer, FilterFamily, FilterSpecification, SynthesisMethod,
    TransferFunction, DEFAULT_SAMPLE_RATE,
};
use plotly::{
    color::NamedColor,
    common::{Line, Mode, Title},
    layout::{Axis, AxisType},
    Layout, Plot, Scatter,
};

const SAMPLE_COUNT: usize = 8000;

fn main() -> anyhow::Result<()> {
    let _ = simple_logger::init_with_level(log::Level::Warn);
    let args: Vec<String> = env::args().skip(1).collect();

    let family: FilterFamily = arg(&args, 0, FilterFamily::Bandpass)?;
    let f0: f64 = arg(&args, 1, 1000.0)?;
    let q: f64 = arg(&args, 2, 5.0)?;
    let order: u32 = arg(&args, 3, 2)?;
    let method: SynthesisMethod = arg(&args, 4, SynthesisMethod::Biquad)?;
    let fs: f64 = arg(&args, 5, DEFAULT_SAMPLE_RATE)?;

    let spec = FilterSpecification {
        family,
        f0: Some(f0),
        q: Some(q),
        order,
        method,
        rp: None,
        rs: None,
        fs,
    };
    println!("requested:\n{spec}\n");

    let tf = design(&spec)?;
    println!("coefficients:\n{tf}\n");

    let inferred = infer(&tf, fs)?;
    println!("inferred:\n{inferred}\n");

    let mut traces = vec![("designed", tf.clone(), NamedColor::Blue)];
    match design(&inferred.to_specification()) {
        Ok(again) => {
            println!("redesigned:\n{again}");
            traces.push(("redesigned", again, NamedColor::Red));
        }
        Err(e) => println!("could not redesign from the inferred parameters: {e}"),
    }

    render(&traces, fs, &format!("{family} {method}, f0 = {f0} Hz"))?;
    Ok(())
}

/// Positional argument `i`, or `default` if it was not given.
fn arg<T>(args: &[String], i: usize, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    args.get(i)
        .map_or(Ok(default), |s| s.parse::<T>().map_err(anyhow::Error::from))
}

/// Plot the magnitude responses in dB over a logarithmic frequency axis.
fn render(
    traces: &[(&str, TransferFunction, NamedColor)],
    fs: f64,
    title: &str,
) -> anyhow::Result<()> {
    let mut plot = Plot::new();
    for (name, tf, color) in traces {
        let response = evaluate(tf, fs, SAMPLE_COUNT)?;
        // DC has no place on a log axis
        let frequencies = response.frequencies()[1..].to_vec();
        let magnitudes = response.magnitude_db()[1..].to_vec();
        let trace = Scatter::new(frequencies, magnitudes)
            .mode(Mode::Lines)
            .line(Line::new().color(*color))
            .name(*name);
        plot.add_trace(trace);
    }
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(title))
            .x_axis(Axis::new().type_(AxisType::Log).title(Title::with_text("Hz")))
            .y_axis(Axis::new().title(Title::with_text("dB"))),
    );
    plot.write_html("roundtrip.html");
    println!("\nplot written to roundtrip.html");
    Ok(())
}
