//! The fixed user-facing texts of the advisory workflow.
//!
//! Everything the controller says outside of LLM-generated content lives
//! here, so the presentation layer never sees raw errors and the wording is
//! testable.

/// Opening message of every session, sent before the first question.
pub const GREETING: &str = "Hello, I am Thomas, your digital investment advisor at Musterbank. \
    I would like to help you find products tailored to building and investing your wealth. \
    To advise you, I will first get to know you through a few questions, then present a \
    suitable product, and afterwards I am happy to answer any open questions about it. \
    Let's start with the questions.";

/// Terminal message when no product satisfies the customer's profile.
pub const NO_MATCH: &str = "I am sorry, but based on your answers I could not find a suitable \
    product in our current offering. Please get in touch with one of our human advisors, who \
    will be happy to look at alternatives with you.";

/// Restated when a customer keeps writing after the no-match terminal state.
pub const NO_FURTHER_ADVICE: &str = "As mentioned, I could not find a suitable product for \
    you in this session. A human advisor will be glad to continue from here.";

/// Sent right after the recommendation, opening the Q&A phase.
pub const FOLLOW_UP_INVITE: &str = "Do you have any further questions about this product?";

/// Sent when the profile extraction failed; invites clarification.
pub const ADVISORY_FAILURE: &str = "I was not able to reliably understand your answers. \
    Could you briefly restate how much you want to invest, for how long, and how much risk \
    you are comfortable with?";

/// Generic transient-failure message; never exposes internal error detail.
pub const TRY_AGAIN_LATER: &str = "Something went wrong on our side. Please try again later.";

/// Shown when the product sheet cannot be delivered; the recommendation
/// itself still stands.
pub const DOWNLOAD_UNAVAILABLE: &str = "The product information sheet is currently not \
    available for download. We will provide it to you later.";
