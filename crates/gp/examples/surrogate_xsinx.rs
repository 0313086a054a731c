use bayesbox_gp::{kernels::SquaredExponentialKernel, GaussianProcess, SurrogateModel};
use linfa::prelude::*;
use ndarray::{arr2, array, concatenate, Array, Array1, Array2, Axis};

fn xsinx(x: &Array2<f64>) -> Array1<f64> {
    ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
}

fn main() {
    let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
    let yt = xsinx(&xt);

    println!("Train GP surrogate of 'xsinx' at {}", xt.column(0));
    let gp = GaussianProcess::params(SquaredExponentialKernel::new(0.15))
        .bounds(array![0.0], array![25.0])
        .fit(&Dataset::new(xt, yt))
        .expect("GP fitting");
    println!("{gp}");

    let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
    let ytest = xsinx(&xtest);
    let (ypred, yvar) = gp.predict(&xtest).expect("GP prediction");
    let ysigma = yvar.mapv(|v| v.max(0.).sqrt());

    let (x_best, y_best) = gp.incumbent().expect("GP incumbent");
    println!("Incumbent f({x_best}) = {y_best}");

    println!("Compute prediction errors (x, err(x), sigma(x))");
    println!(
        "{}",
        concatenate![
            Axis(1),
            xtest,
            (ypred - ytest).insert_axis(Axis(1)),
            ysigma.insert_axis(Axis(1))
        ]
    );
}
