//! Two-phase pipeline stages
//!
//! A stage is fitted once on training data, producing a fitted stage that
//! transforms any number of later batches without changing. Stages compose
//! with [`Chain`]: fitting a chain fits the first stage, feeds the training
//! input through it, then fits the second stage on the result.

use serde::{Deserialize, Serialize};

/// Fitted stage: maps one batch to the next representation
pub trait Transformer {
    type Input: ?Sized;
    type Output;
    type Error;

    fn transform(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// Unfitted stage: learns its state from training data and labels
pub trait Estimator {
    type Input: ?Sized;
    type Fitted;
    type Error;

    fn fit(&self, input: &Self::Input, target: &[u8]) -> Result<Self::Fitted, Self::Error>;
}

/// Two stages run in sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

/// Builder sugar for chaining stages: `a.then(b).then(c)`
pub trait StageExt: Sized {
    fn then<B>(self, next: B) -> Chain<Self, B> {
        Chain::new(self, next)
    }
}

impl<T> StageExt for T {}

impl<A, B> Transformer for Chain<A, B>
where
    A: Transformer,
    B: Transformer<Input = A::Output>,
    B::Error: From<A::Error>,
{
    type Input = A::Input;
    type Output = B::Output;
    type Error = B::Error;

    fn transform(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let intermediate = self.first.transform(input)?;
        self.second.transform(&intermediate)
    }
}

impl<A, B> Estimator for Chain<A, B>
where
    A: Estimator,
    A::Fitted: Transformer<Input = A::Input>,
    B: Estimator<Input = <A::Fitted as Transformer>::Output>,
    B::Error: From<A::Error> + From<<A::Fitted as Transformer>::Error>,
{
    type Input = A::Input;
    type Fitted = Chain<A::Fitted, B::Fitted>;
    type Error = B::Error;

    fn fit(&self, input: &Self::Input, target: &[u8]) -> Result<Self::Fitted, Self::Error> {
        let first = self.first.fit(input, target)?;
        let intermediate = first.transform(input)?;
        let second = self.second.fit(&intermediate, target)?;
        Ok(Chain { first, second })
    }
}
