use ferrite_ml::data::split;
use ferrite_ml::metrics::{class_metrics, overall_accuracy};
use ferrite_ml::optim::schedule::constant;
use ferrite_ml::{ActivationFunction, Layer, LossType, Matrix, Sequential, StdPrng, TrainConfig};
use std::sync::mpsc;
use std::thread;

fn main() -> ferrite_ml::Result<()> {
    let mut prng = StdPrng::from_entropy();
    println!("seed: {}", prng.seed());

    // Four XOR cases repeated; the target is one-hot over {0, 1}.
    let cases = [([0.0, 0.0], 0), ([0.0, 1.0], 1), ([1.0, 0.0], 1), ([1.0, 1.0], 0)];
    let mut x_rows = Vec::new();
    let mut y_rows = Vec::new();
    for _ in 0..25 {
        for (input, class) in cases {
            x_rows.push(input.to_vec());
            let mut one_hot = vec![0.0; 2];
            one_hot[class] = 1.0;
            y_rows.push(one_hot);
        }
    }
    let x = Matrix::from_rows(x_rows)?;
    let y = Matrix::from_rows(y_rows)?;
    let data = split(&x, &y, 0.0, 0.2, Some(&mut prng))?;
    let (train_x, train_y) = &data.train;
    let (test_x, test_y) = &data.test;

    let mut model = Sequential::new(
        vec![
            Layer::new(8, ActivationFunction::Tanh),
            Layer::new(2, ActivationFunction::Softmax),
        ],
        2,
        LossType::MultiClassCrossEntropy,
    )?;
    model.compile(Some(&mut prng))?;
    println!("{}", model.summary()?);

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(0.5, 3000);
    config.progress_tx = Some(tx);

    let printer = thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 500 == 0 || stats.epoch == stats.total_epochs {
                println!("epoch {:>5}/{}: loss = {:.6}", stats.epoch, stats.total_epochs, stats.loss);
            }
        }
    });
    model.fit_with_config(train_x, train_y, constant, &config)?;
    drop(config);
    let _ = printer.join();

    let mut yhat = model.predict(test_x)?;
    yhat.softmax_rows();
    println!("\nconfusion matrix (rows: actual, cols: predicted)");
    print!("{}", Matrix::confusion(&yhat, test_y)?);

    let scores = class_metrics(&yhat, test_y)?;
    for class in 0..scores.precision.len() {
        println!(
            "class {}: precision {:.3}  recall {:.3}  accuracy {:.3}  f1 {:.3}",
            class, scores.precision[class], scores.recall[class], scores.accuracy[class], scores.f1[class]
        );
    }
    println!("overall accuracy: {:.3}", overall_accuracy(&yhat, test_y)?);
    Ok(())
}
