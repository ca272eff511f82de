pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    FollowResponse, __path_follow, __path_forget, __path_get_own_profile,
    __path_get_profile_by_id, __path_search, __path_signin, __path_signup, __path_unfollow,
    __path_update, __path_verify, follow, forget, get_own_profile, get_profile_by_id, init_routes,
    search, signin, signup, unfollow, update, verify,
};

pub use structures::{
    ForgetRequest, ProfileResponse, ProfileView, SearchQuery, SearchResponse, SigninRequest,
    SigninResponse, SignupRequest, TokenResponse, UpdateRequest, UserChanges, UserSummary,
    VerifyRequest,
};
