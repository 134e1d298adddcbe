pub mod game;
pub mod session;

pub use game::{
    BoardResponse, GradeRequest, GradeResponse, GroupsResponse, QuestionResponse,
    SpecialTileInfo, SpinGroupRequest, SpinGroupResponse, SpinQuestionRequest,
};
pub use session::{SessionAnswerRequest, SessionAnswerResponse, SessionCreatedResponse, SessionView};
