/*
[INPUT]:  Hosted API and external service payload shapes
[OUTPUT]: Serde request/response types for cart, order and refresh calls
[POS]:    Data layer - wire types shared by the HTTP clients
[UPDATE]: When a hosted endpoint payload changes
*/

mod enums;
mod requests;
mod responses;

pub use enums::*;
pub use requests::*;
pub use responses::*;
