use ferrite_ml::data::split;
use ferrite_ml::metrics::regression_metrics;
use ferrite_ml::optim::schedule::constant;
use ferrite_ml::{ActivationFunction, Layer, LossType, Matrix, Prng, Sequential, StdPrng};

// f(x) = 3x + 2 + noise
fn f(x: f64, prng: &mut dyn Prng) -> f64 {
    3.0 * x + 2.0 + prng.normal(0.0, 0.02)
}

fn main() -> ferrite_ml::Result<()> {
    let mut prng = StdPrng::from_entropy();

    let n = 100;
    let mut x = Matrix::zeros(n, 1);
    let mut y = Matrix::zeros(n, 1);
    for i in 0..n {
        let xi = prng.uniform(-1.0, 1.0);
        x[(i, 0)] = xi;
        y[(i, 0)] = f(xi, &mut prng);
    }

    let data = split(&x, &y, 0.25, 0.15, None)?;
    let (train_x, train_y) = &data.train;
    let (test_x, test_y) = &data.test;

    let mut model = Sequential::new(
        vec![
            Layer::new(32, ActivationFunction::ReLU),
            Layer::new(1, ActivationFunction::Linear),
        ],
        train_x.cols(),
        LossType::SquaredError,
    )?;
    model.compile(Some(&mut prng))?;
    println!("{}", model.summary()?);

    let history = model.fit(train_x, train_y, constant, 0.05, 5000)?;
    if let Some(last) = history.last() {
        println!("final training loss: {:.6}", last.loss);
    }
    println!("validation loss: {:.6}", model.evaluate(&data.validation.0, &data.validation.1)?);

    let yhat = model.predict(test_x)?;
    let r = regression_metrics(&yhat, test_y, train_x.cols(), 0.2)?;
    println!("\nRegression metrics");
    println!("-------------------------------------------");
    println!("Mean Absolute Error          : {}", r.mae);
    println!("Mean Squared Error           : {}", r.mse);
    println!("Root Mean Squared Error      : {}", r.rmse);
    println!("R-Squared                    : {}", r.r_squared);
    println!("Adjusted R-Squared           : {}", r.adjusted_r_squared);
    println!("MAPE (%)                     : {}", r.mape);
    println!("sMAPE (%)                    : {}", r.smape);
    println!("Huber Loss                   : {}", r.huber);
    println!("Explained Variance           : {}", r.explained_variance);
    println!("Median Absolute Error        : {}", r.median_absolute_error);
    println!("-------------------------------------------");
    Ok(())
}
