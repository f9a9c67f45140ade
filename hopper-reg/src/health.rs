//  HEALTH.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 11:32:06
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the `/health` path, which reports liveness and nothing
//!   else.
//

use warp::Filter as _;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;


/***** LIBRARY *****/
/// Returns the warp filter for the `/health` path.
pub fn routes() -> BoxedFilter<(StatusCode,)> {
    warp::get().and(warp::path("health")).and(warp::path::end()).map(|| StatusCode::OK).boxed()
}





/***** TESTS *****/
