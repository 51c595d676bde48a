//! Language handling: script detection, pronunciation dictionary, G2P.

pub mod cmudict;
pub mod g2p;
pub mod script;
